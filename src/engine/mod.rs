//! FusionEngine - detection fusion & arbitration facade
//!
//! ## Responsibilities
//!
//! - Per-call pipeline: frame validation -> signal collection ->
//!   temporal confirmation -> severity -> arbitration -> standardization
//! - Keyed session state with per-key serialization
//! - Adapter failure isolation (one bad detector never aborts the call)
//! - Debug/diagnostics output
//!
//! Adapter calls run before the session lock is taken; tracker mutation is
//! synchronous inside the lock, so a cancelled call either applied the
//! whole observation or none of it.

use crate::adapter::{AdapterContext, SignalAdapter};
use crate::arbitration::{confidence_for, ArbitrationEngine};
use crate::config::{EngineConfig, LeakConfirmationPolicy, OccupiedEnergyPolicy};
use crate::confirmation::{
    ConfirmedEvent, DurationOutcome, RollingOutcome, SessionStore, SessionTrackers,
    DEFAULT_SESSION_KEY,
};
use crate::error::{Error, Result};
use crate::report::{self, UnifiedReport};
use crate::severity::{classify_waste, Severity};
use crate::signal::{Frame, IssueKind, RawSignal, SignalKind, SignalPayload};
use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// One analysis call
#[derive(Debug)]
pub struct AnalyzeRequest {
    /// Session (camera) key; defaults to the implicit global session
    pub session_key: Option<String>,
    /// Decoded image
    pub frame: Frame,
    /// Pre-computed signals. When `None`, the engine's registered
    /// adapters are invoked instead.
    pub signals: Option<HashMap<SignalKind, RawSignal>>,
    /// Observation timestamp; defaults to now
    pub observed_at: Option<DateTime<Utc>>,
    /// Include raw/per-kind diagnostics in the response
    pub debug: bool,
}

impl AnalyzeRequest {
    pub fn new(frame: Frame) -> Self {
        Self {
            session_key: None,
            frame,
            signals: None,
            observed_at: None,
            debug: false,
        }
    }
}

/// One adapter failure, reported on the diagnostics channel only
#[derive(Debug, Clone, Serialize)]
pub struct AdapterFailure {
    pub kind: SignalKind,
    pub message: String,
}

/// Diagnostics returned in debug mode
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    /// Raw adapter output per kind (null where the kind was absent/failed)
    pub raw_detections: HashMap<SignalKind, Option<RawSignal>>,
    /// The standardized verdict
    pub verified_detections: UnifiedReport,
    /// Which issue kinds passed temporal confirmation this call
    pub detection_summary: HashMap<IssueKind, bool>,
    pub adapter_failures: Vec<AdapterFailure>,
}

/// Analysis result
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub report: UnifiedReport,
    pub session_key: String,
    pub observed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

/// Detection fusion & arbitration engine
pub struct FusionEngine {
    config: EngineConfig,
    arbitration: ArbitrationEngine,
    sessions: SessionStore,
    adapters: Vec<Arc<dyn SignalAdapter>>,
}

impl FusionEngine {
    /// Create an engine; configuration is validated up front
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let arbitration = ArbitrationEngine::new(config.arbitration.clone());
        Ok(Self {
            config,
            arbitration,
            sessions: SessionStore::new(),
            adapters: Vec::new(),
        })
    }

    /// Register a signal adapter (builder style)
    pub fn with_adapter(mut self, adapter: Arc<dyn SignalAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze one image and return exactly one verdict
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
        let AnalyzeRequest {
            session_key,
            frame,
            signals,
            observed_at,
            debug,
        } = request;

        // Fatal before any state is touched
        frame.validate()?;

        let observed_at = observed_at.unwrap_or_else(Utc::now);
        let session_key = session_key.unwrap_or_else(|| DEFAULT_SESSION_KEY.to_string());

        // Collect signals with no tracker lock held
        let supplied = signals.is_some();
        let (signals, failures) = match signals {
            Some(map) => self.validate_supplied(map),
            None => self.run_adapters(&frame, &session_key, observed_at),
        };

        if !supplied && !self.adapters.is_empty() && signals.is_empty() && !failures.is_empty() {
            // Absence of evidence is not surfaced as an error, but a full
            // outage is worth an operator's attention
            tracing::error!(
                session_key = %session_key,
                failed = failures.len(),
                "Full adapter outage: every signal kind failed this call"
            );
        }

        // Temporal confirmation under the session lock
        let entry = self.sessions.get_or_create(&session_key, &self.config).await;
        let confirmed = {
            let mut trackers = entry.lock().await;
            self.confirm(&mut trackers, &signals, observed_at)
        };

        // Arbitration and standardization
        let winner = self.arbitration.arbitrate(&confirmed);
        let report = match &winner {
            Some(candidate) => {
                tracing::info!(
                    session_key = %session_key,
                    kind = %candidate.kind,
                    priority = candidate.priority,
                    confidence = candidate.confidence,
                    severity = %candidate.event.severity,
                    "Verdict selected"
                );
                report::for_candidate(candidate)
            }
            None => {
                tracing::debug!(session_key = %session_key, "No issue confirmed");
                report::no_issue()
            }
        };

        let debug = debug.then(|| self.build_debug(&signals, &confirmed, &report, failures));

        Ok(AnalyzeResponse {
            report,
            session_key,
            observed_at,
            debug,
        })
    }

    /// Wipe all temporal state for a session. Returns whether any state
    /// existed.
    pub async fn reset(&self, session_key: &str) -> bool {
        let removed = self.sessions.reset(session_key).await;
        tracing::info!(session_key = %session_key, removed, "Session trackers reset");
        removed
    }

    // ========================================
    // Internal Methods
    // ========================================

    fn run_adapters(
        &self,
        frame: &Frame,
        session_key: &str,
        observed_at: DateTime<Utc>,
    ) -> (HashMap<SignalKind, RawSignal>, Vec<AdapterFailure>) {
        let ctx = AdapterContext {
            session_key: session_key.to_string(),
            observed_at,
        };

        let mut signals = HashMap::new();
        let mut failures = Vec::new();

        for adapter in &self.adapters {
            let kind = adapter.kind();
            match adapter.detect(frame, &ctx) {
                Ok(signal) => match self.accept(kind, signal) {
                    Ok(signal) => {
                        signals.insert(kind, signal);
                    }
                    Err(e) => failures.push(Self::record_failure(kind, e)),
                },
                Err(e) => failures.push(Self::record_failure(kind, e)),
            }
        }

        (signals, failures)
    }

    fn validate_supplied(
        &self,
        supplied: HashMap<SignalKind, RawSignal>,
    ) -> (HashMap<SignalKind, RawSignal>, Vec<AdapterFailure>) {
        let mut signals = HashMap::new();
        let mut failures = Vec::new();

        for (kind, signal) in supplied {
            match self.accept(kind, signal) {
                Ok(signal) => {
                    signals.insert(kind, signal);
                }
                Err(e) => failures.push(Self::record_failure(kind, e)),
            }
        }

        (signals, failures)
    }

    /// Boundary validation for one incoming signal
    fn accept(&self, expected: SignalKind, signal: RawSignal) -> Result<RawSignal> {
        if signal.kind() != expected {
            return Err(Error::Adapter {
                kind: expected,
                message: format!("payload kind mismatch: got {}", signal.kind()),
            });
        }
        signal.validate()?;
        Ok(signal)
    }

    fn record_failure(kind: SignalKind, error: Error) -> AdapterFailure {
        tracing::warn!(kind = %kind, error = %error, code = error.code(), "Signal excluded for this call");
        AdapterFailure {
            kind,
            message: error.to_string(),
        }
    }

    /// Run every confirmation policy against this call's signals.
    /// Synchronous on purpose: the caller holds the session lock and must
    /// not await while tracker state is mid-update.
    fn confirm(
        &self,
        trackers: &mut SessionTrackers,
        signals: &HashMap<SignalKind, RawSignal>,
        now: DateTime<Utc>,
    ) -> Vec<ConfirmedEvent> {
        let person_present = signals
            .get(&SignalKind::Person)
            .map(|s| s.present)
            .unwrap_or(false);

        // Occupancy first so the energy gate sees the latest sighting
        trackers.occupancy.observe(person_present, now);

        let mut confirmed = Vec::new();

        self.confirm_water(trackers, signals, person_present, now, &mut confirmed);
        self.confirm_access(trackers, signals, person_present, now, &mut confirmed);
        self.confirm_infrastructure(signals, &mut confirmed);
        self.confirm_waste(signals, &mut confirmed);
        self.confirm_energy(trackers, signals, person_present, now, &mut confirmed);

        confirmed
    }

    fn confirm_water(
        &self,
        trackers: &mut SessionTrackers,
        signals: &HashMap<SignalKind, RawSignal>,
        person_present: bool,
        now: DateTime<Utc>,
        confirmed: &mut Vec<ConfirmedEvent>,
    ) {
        let signal = match signals.get(&SignalKind::Water) {
            Some(s) => s,
            None => return,
        };
        let area = signal.score();
        let puddle_count = match signal.payload {
            SignalPayload::Water { puddle_count, .. } => puddle_count,
            _ => 0,
        };

        match self.config.leak_policy {
            LeakConfirmationPolicy::RollingAverage => {
                match trackers.leak.observe(area, person_present) {
                    RollingOutcome::Confirmed { mean } => {
                        let severity = self.config.severity.water_area.classify(mean);
                        confirmed.push(ConfirmedEvent {
                            kind: IssueKind::WaterLeak,
                            severity,
                            score: mean,
                            confidence: confidence_for(IssueKind::WaterLeak, mean),
                            attributes: Some(json!({
                                "mean_area": mean,
                                "samples": trackers.leak.len(),
                                "puddle_count": puddle_count,
                            })),
                        });
                    }
                    outcome => {
                        tracing::trace!(area, ?outcome, "Leak unconfirmed");
                    }
                }
            }
            LeakConfirmationPolicy::DurationCooldown => {
                // A person occludes the floor, so their presence counts as
                // the condition being absent
                let condition =
                    signal.present && area >= self.config.min_leak_area && !person_present;
                match trackers.leak_alert.observe(condition, now) {
                    DurationOutcome::Confirmed {
                        confirmed_after_secs,
                    } => {
                        let severity = self.config.severity.water_area.classify(area);
                        confirmed.push(ConfirmedEvent {
                            kind: IssueKind::WaterLeak,
                            severity,
                            score: area,
                            confidence: confidence_for(IssueKind::WaterLeak, area),
                            attributes: Some(json!({
                                "confirmed_after_seconds": confirmed_after_secs,
                                "puddle_count": puddle_count,
                            })),
                        });
                    }
                    outcome => {
                        tracing::trace!(area, ?outcome, "Leak alert unconfirmed");
                    }
                }
            }
        }
    }

    fn confirm_access(
        &self,
        trackers: &mut SessionTrackers,
        signals: &HashMap<SignalKind, RawSignal>,
        person_present: bool,
        now: DateTime<Utc>,
        confirmed: &mut Vec<ConfirmedEvent>,
    ) {
        let restricted = self.config.access_window.is_restricted(now.hour());
        let condition = person_present && restricted;

        match trackers.access.observe(condition, now) {
            DurationOutcome::Confirmed {
                confirmed_after_secs,
            } => {
                let score = signals
                    .get(&SignalKind::Person)
                    .map(|s| s.score())
                    .unwrap_or(1.0);
                let window = &self.config.access_window;
                confirmed.push(ConfirmedEvent {
                    kind: IssueKind::UnauthorizedAccess,
                    severity: Severity::High,
                    score,
                    confidence: confidence_for(IssueKind::UnauthorizedAccess, score),
                    attributes: Some(json!({
                        "confirmed_after_seconds": confirmed_after_secs,
                        "permitted_hours": format!("{}:00-{}:00", window.start_hour, window.end_hour),
                        "observed_hour": now.hour(),
                    })),
                });
            }
            DurationOutcome::InCooldown { remaining_secs } => {
                tracing::debug!(
                    remaining_secs,
                    "Unauthorized presence within re-alert cooldown"
                );
            }
            _ => {}
        }
    }

    fn confirm_infrastructure(
        &self,
        signals: &HashMap<SignalKind, RawSignal>,
        confirmed: &mut Vec<ConfirmedEvent>,
    ) {
        let signal = match signals.get(&SignalKind::Infrastructure) {
            Some(s) if s.present => s,
            _ => return,
        };
        let damage = signal.score();
        let bands = &self.config.severity.infrastructure_damage;
        // The medium breakpoint doubles as the base confirmation floor
        if damage < bands.medium {
            return;
        }

        let broken_items = match signal.payload {
            SignalPayload::Infrastructure { broken_items, .. } => broken_items,
            _ => 0,
        };
        confirmed.push(ConfirmedEvent {
            kind: IssueKind::BrokenInfrastructure,
            severity: bands.classify(damage),
            score: damage,
            confidence: confidence_for(IssueKind::BrokenInfrastructure, damage),
            attributes: Some(json!({ "broken_items": broken_items })),
        });
    }

    fn confirm_waste(
        &self,
        signals: &HashMap<SignalKind, RawSignal>,
        confirmed: &mut Vec<ConfirmedEvent>,
    ) {
        let signal = match signals.get(&SignalKind::Waste) {
            Some(s) if s.present => s,
            _ => return,
        };
        let (clutter_score, object_count) = match signal.payload {
            SignalPayload::Waste {
                clutter_score,
                object_count,
            } => (clutter_score, object_count),
            _ => return,
        };

        let severity = classify_waste(
            &self.config.severity.waste_score,
            &self.config.severity.waste_objects,
            clutter_score,
            object_count,
        );
        confirmed.push(ConfirmedEvent {
            kind: IssueKind::Waste,
            severity,
            score: clutter_score,
            confidence: confidence_for(IssueKind::Waste, clutter_score),
            attributes: Some(json!({ "objects": object_count })),
        });
    }

    fn confirm_energy(
        &self,
        trackers: &mut SessionTrackers,
        signals: &HashMap<SignalKind, RawSignal>,
        person_present: bool,
        now: DateTime<Utc>,
        confirmed: &mut Vec<ConfirmedEvent>,
    ) {
        let lights_on = signals
            .get(&SignalKind::Light)
            .map(|s| s.present)
            .unwrap_or(false);
        let fan_running = signals
            .get(&SignalKind::Fan)
            .map(|s| s.present)
            .unwrap_or(false);
        if !lights_on && !fan_running {
            return;
        }

        let excluded_by_presence = self.config.occupied_energy_policy
            == OccupiedEnergyPolicy::ExcludeWhileOccupied
            && person_present;
        if !trackers.occupancy.empty_long_enough(now) || excluded_by_presence {
            tracing::debug!(
                lights_on,
                fan_running,
                "Room occupied, energy-waste signal suppressed"
            );
            return;
        }

        confirmed.push(ConfirmedEvent {
            kind: IssueKind::EnergyWaste,
            severity: Severity::Medium,
            score: 1.0,
            confidence: confidence_for(IssueKind::EnergyWaste, 1.0),
            attributes: Some(json!({
                "lights_on": lights_on,
                "fan_running": fan_running,
            })),
        });
    }

    fn build_debug(
        &self,
        signals: &HashMap<SignalKind, RawSignal>,
        confirmed: &[ConfirmedEvent],
        report: &UnifiedReport,
        failures: Vec<AdapterFailure>,
    ) -> DebugInfo {
        let raw_detections = SignalKind::ALL
            .iter()
            .map(|kind| (*kind, signals.get(kind).cloned()))
            .collect();
        let detection_summary = IssueKind::ALL
            .iter()
            .map(|kind| (*kind, confirmed.iter().any(|e| e.kind == *kind)))
            .collect();

        DebugInfo {
            raw_detections,
            verified_detections: report.clone(),
            detection_summary,
            adapter_failures: failures,
        }
    }
}
