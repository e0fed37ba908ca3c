//! Temporal confirmation trackers
//!
//! ## Responsibilities
//!
//! - Promote raw per-call signals into confirmed events over time
//! - Keyed per-session tracker state (never ambient globals)
//! - Per-key serialization of read-modify-write, cross-key parallelism
//! - Atomic session reset

pub mod absence;
pub mod duration;
pub mod rolling;

pub use absence::OccupancyTracker;
pub use duration::{DurationCooldownTracker, DurationOutcome};
pub use rolling::{RollingAreaTracker, RollingOutcome};

use crate::config::EngineConfig;
use crate::severity::Severity;
use crate::signal::IssueKind;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Implicit session used when the caller supplies no key.
///
/// Matches the behavior of single-camera deployments, but is unsafe for
/// multi-camera use: all cameras would share one set of trackers.
pub const DEFAULT_SESSION_KEY: &str = "__global__";

/// A raw signal promoted into a trusted event after passing its
/// confirmation policy. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmedEvent {
    pub kind: IssueKind,
    pub severity: Severity,
    /// Kind-specific score (rolling mean area, clutter score, damage score)
    pub score: f64,
    /// Arbitration confidence in [0, 1]
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

/// All temporal trackers for one session
#[derive(Debug)]
pub struct SessionTrackers {
    /// Rolling-average leak confirmation
    pub leak: RollingAreaTracker,
    /// Duration+cooldown leak-alert confirmation (alternate policy)
    pub leak_alert: DurationCooldownTracker,
    /// Unauthorized-access cooldown (confirms on sight, cooled down after)
    pub access: DurationCooldownTracker,
    /// Room occupancy for energy-waste eligibility
    pub occupancy: OccupancyTracker,
}

impl SessionTrackers {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            leak: RollingAreaTracker::new(
                config.rolling_window_capacity,
                config.min_samples,
                config.min_leak_area,
            ),
            leak_alert: DurationCooldownTracker::new(
                config.confirm_duration_secs,
                config.alert_cooldown_secs,
            ),
            access: DurationCooldownTracker::new(0, config.alert_cooldown_secs),
            occupancy: OccupancyTracker::new(config.empty_room_threshold_secs),
        }
    }
}

/// Keyed store of per-session trackers.
///
/// The outer map is read-mostly; each session entry carries its own Mutex
/// so calls for the same session serialize while different sessions
/// proceed in parallel. Tracker mutation happens synchronously inside the
/// entry lock, so a cancelled call can never leave a session half-updated.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionTrackers>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the trackers for a session, creating them lazily
    pub async fn get_or_create(
        &self,
        session_key: &str,
        config: &EngineConfig,
    ) -> Arc<Mutex<SessionTrackers>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(entry) = sessions.get(session_key) {
                return entry.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_key.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_key = %session_key, "Session trackers created");
                Arc::new(Mutex::new(SessionTrackers::new(config)))
            })
            .clone()
    }

    /// Drop all tracker state for a session. The next observation starts
    /// from pristine state, identical to a brand-new session.
    pub async fn reset(&self, session_key: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_key).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
