//! Arbitration engine
//!
//! ## Responsibilities
//!
//! - Resolve this call's confirmed events into at most one candidate
//! - Fixed per-kind priority, kind-specific confidence
//! - Arbitration-level score gates on top of base confirmation
//! - Mutual exclusion (confirmed broken infrastructure suppresses waste)
//!
//! Selection is deterministic: sort by (priority ascending, confidence
//! descending) and take the first. Specificity beats raw confidence.

use crate::config::{ArbitrationRule, ArbitrationRules};
use crate::confirmation::ConfirmedEvent;
use crate::signal::IssueKind;
use std::cmp::Ordering;

/// One confirmed event lifted into the arbitration round
#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: IssueKind,
    /// 1 = highest
    pub priority: u8,
    pub confidence: f64,
    pub event: ConfirmedEvent,
}

/// Kind-specific arbitration confidence.
///
/// Water and unauthorized access are treated as highly specific detectors;
/// energy waste is the most false-positive-prone (shadows, reflections).
pub fn confidence_for(kind: IssueKind, score: f64) -> f64 {
    match kind {
        IssueKind::WaterLeak => 0.95,
        IssueKind::UnauthorizedAccess => 0.90,
        IssueKind::BrokenInfrastructure => score.min(1.0),
        IssueKind::Waste => (score / 40.0).min(1.0),
        IssueKind::EnergyWaste => 0.65,
    }
}

pub struct ArbitrationEngine {
    rules: ArbitrationRules,
}

impl ArbitrationEngine {
    pub fn new(rules: ArbitrationRules) -> Self {
        Self { rules }
    }

    pub fn rule(&self, kind: IssueKind) -> ArbitrationRule {
        match kind {
            IssueKind::WaterLeak => self.rules.water_leak,
            IssueKind::UnauthorizedAccess => self.rules.unauthorized_access,
            IssueKind::BrokenInfrastructure => self.rules.broken_infrastructure,
            IssueKind::Waste => self.rules.waste,
            IssueKind::EnergyWaste => self.rules.energy_waste,
        }
    }

    fn passes_gate(&self, kind: IssueKind, score: f64) -> bool {
        match self.rule(kind).min_score {
            Some(floor) => score > floor,
            None => true,
        }
    }

    /// Pick at most one candidate from this call's confirmed events
    pub fn arbitrate(&self, events: &[ConfirmedEvent]) -> Option<Candidate> {
        // Mutual exclusion input: a broken chair must not also register
        // as clutter
        let infrastructure_broken = events.iter().any(|e| {
            e.kind == IssueKind::BrokenInfrastructure
                && e.score.is_finite()
                && self.passes_gate(e.kind, e.score)
        });

        let mut candidates: Vec<Candidate> = Vec::with_capacity(events.len());
        for event in events {
            if !event.score.is_finite() {
                tracing::warn!(
                    kind = %event.kind,
                    "Malformed confirmed event dropped from arbitration"
                );
                continue;
            }
            if !self.passes_gate(event.kind, event.score) {
                tracing::debug!(
                    kind = %event.kind,
                    score = event.score,
                    "Candidate below arbitration gate"
                );
                continue;
            }
            if event.kind == IssueKind::Waste && infrastructure_broken {
                tracing::debug!(
                    clutter_score = event.score,
                    "Waste excluded: infrastructure confirmed broken this call"
                );
                continue;
            }

            candidates.push(Candidate {
                kind: event.kind,
                priority: self.rule(event.kind).priority,
                confidence: confidence_for(event.kind, event.score),
                event: event.clone(),
            });
        }

        candidates.sort_by(|a, b| {
            a.priority.cmp(&b.priority).then(
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal),
            )
        });
        candidates.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    fn event(kind: IssueKind, score: f64) -> ConfirmedEvent {
        ConfirmedEvent {
            kind,
            severity: Severity::Medium,
            score,
            confidence: confidence_for(kind, score),
            attributes: None,
        }
    }

    fn engine() -> ArbitrationEngine {
        ArbitrationEngine::new(ArbitrationRules::default())
    }

    #[test]
    fn test_empty_input_yields_no_candidate() {
        assert!(engine().arbitrate(&[]).is_none());
    }

    #[test]
    fn test_priority_beats_confidence() {
        // Waste at confidence ~1.0 still loses to water at 0.95
        let events = vec![
            event(IssueKind::Waste, 40.0),
            event(IssueKind::WaterLeak, 800.0),
        ];
        let winner = engine().arbitrate(&events).unwrap();
        assert_eq!(winner.kind, IssueKind::WaterLeak);
        assert_eq!(winner.confidence, 0.95);
    }

    #[test]
    fn test_water_dominates_every_lower_priority_kind() {
        for other in [
            IssueKind::UnauthorizedAccess,
            IssueKind::BrokenInfrastructure,
            IssueKind::Waste,
            IssueKind::EnergyWaste,
        ] {
            let events = vec![event(IssueKind::WaterLeak, 700.0), event(other, 0.9 * 40.0)];
            let winner = engine().arbitrate(&events).unwrap();
            assert_eq!(winner.kind, IssueKind::WaterLeak, "lost to {:?}", other);
        }
    }

    #[test]
    fn test_mutual_exclusion_broken_suppresses_waste() {
        let events = vec![
            event(IssueKind::BrokenInfrastructure, 0.6),
            event(IssueKind::Waste, 30.0),
        ];
        let winner = engine().arbitrate(&events).unwrap();
        assert_eq!(winner.kind, IssueKind::BrokenInfrastructure);
        assert!((winner.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_gated_infrastructure_does_not_suppress_waste() {
        // Damage below the 0.55 gate: neither a candidate nor an excluder
        let events = vec![
            event(IssueKind::BrokenInfrastructure, 0.52),
            event(IssueKind::Waste, 30.0),
        ];
        let winner = engine().arbitrate(&events).unwrap();
        assert_eq!(winner.kind, IssueKind::Waste);
    }

    #[test]
    fn test_waste_gate_requires_clutter_above_25() {
        let events = vec![event(IssueKind::Waste, 25.0)];
        assert!(engine().arbitrate(&events).is_none());

        let events = vec![event(IssueKind::Waste, 25.1)];
        assert!(engine().arbitrate(&events).is_some());
    }

    #[test]
    fn test_malformed_event_dropped_not_fatal() {
        let events = vec![
            event(IssueKind::WaterLeak, f64::NAN),
            event(IssueKind::EnergyWaste, 1.0),
        ];
        let winner = engine().arbitrate(&events).unwrap();
        assert_eq!(winner.kind, IssueKind::EnergyWaste);
    }

    #[test]
    fn test_equal_priority_prefers_higher_confidence() {
        let mut rules = ArbitrationRules::default();
        rules.waste.priority = 5; // tie with energy waste
        rules.waste.min_score = None;
        let engine = ArbitrationEngine::new(rules);

        // Waste at 36/40 = 0.9 beats energy waste's fixed 0.65
        let events = vec![
            event(IssueKind::EnergyWaste, 1.0),
            event(IssueKind::Waste, 36.0),
        ];
        let winner = engine.arbitrate(&events).unwrap();
        assert_eq!(winner.kind, IssueKind::Waste);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let events = vec![
            event(IssueKind::Waste, 30.0),
            event(IssueKind::EnergyWaste, 1.0),
            event(IssueKind::UnauthorizedAccess, 0.8),
        ];
        let engine = engine();
        let first = engine.arbitrate(&events).unwrap();
        for _ in 0..10 {
            let again = engine.arbitrate(&events).unwrap();
            assert_eq!(again.kind, first.kind);
            assert_eq!(again.confidence, first.confidence);
        }
    }

    #[test]
    fn test_confidence_formulas() {
        assert_eq!(confidence_for(IssueKind::WaterLeak, 9999.0), 0.95);
        assert_eq!(confidence_for(IssueKind::UnauthorizedAccess, 0.1), 0.90);
        assert_eq!(confidence_for(IssueKind::BrokenInfrastructure, 0.72), 0.72);
        assert_eq!(confidence_for(IssueKind::BrokenInfrastructure, 1.4), 1.0);
        assert_eq!(confidence_for(IssueKind::Waste, 20.0), 0.5);
        assert_eq!(confidence_for(IssueKind::Waste, 80.0), 1.0);
        assert_eq!(confidence_for(IssueKind::EnergyWaste, 1.0), 0.65);
    }
}
