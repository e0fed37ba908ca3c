//! Standardization layer
//!
//! Projects the winning candidate into the unified external schema.
//! Table-driven: one template per kind (label, category, canned risk text,
//! confidence derivation). Output uses only plain string/number values
//! regardless of what adapters produce internally.

use crate::arbitration::Candidate;
use crate::severity::Severity;
use crate::signal::IssueKind;
use serde::{Deserialize, Serialize};

/// Report category in the unified schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Plumbing,
    Cleanliness,
    Safety,
    Infrastructure,
    Electrical,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plumbing => "Plumbing",
            Category::Cleanliness => "Cleanliness",
            Category::Safety => "Safety",
            Category::Infrastructure => "Infrastructure",
            Category::Electrical => "Electrical",
            Category::General => "General",
        }
    }

    /// Canned risk text for the category
    pub fn risks(&self) -> &'static str {
        match self {
            Category::Plumbing => "Slip hazard, water damage to flooring and nearby equipment",
            Category::Cleanliness => "Hygiene risk, pest attraction, blocked walkways",
            Category::Safety => "Potential intrusion or unauthorized room usage",
            Category::Infrastructure => "Injury risk from damaged furniture or fixtures",
            Category::Electrical => "Unnecessary power consumption and equipment wear",
            Category::General => "No known risks",
        }
    }
}

/// Unified external schema, always fully populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedReport {
    /// Human-readable label, e.g. "WATER LEAK / SPILL"
    pub detection: String,
    pub category: String,
    /// "Low" | "Medium" | "High"
    pub severity: String,
    pub risks: String,
    /// 0-100
    pub confidence: i32,
}

/// The terminal "nothing to report" verdict
pub fn no_issue() -> UnifiedReport {
    UnifiedReport {
        detection: "No Issue".to_string(),
        category: Category::General.as_str().to_string(),
        severity: Severity::Low.title().to_string(),
        risks: Category::General.risks().to_string(),
        confidence: 0,
    }
}

/// Per-kind template projection.
///
/// `severity` is taken from the confirmed event where the kind carries
/// one; a missing severity falls back to "Medium". The confidence integer
/// is derived from the kind's own formula, not the arbitration confidence.
pub fn standardize(kind: IssueKind, severity: Option<Severity>, score: f64) -> UnifiedReport {
    let event_severity = || {
        severity
            .map(|s| s.title())
            .unwrap_or(Severity::Medium.title())
            .to_string()
    };

    match kind {
        IssueKind::WaterLeak => UnifiedReport {
            detection: "WATER LEAK / SPILL".to_string(),
            category: Category::Plumbing.as_str().to_string(),
            severity: event_severity(),
            risks: Category::Plumbing.risks().to_string(),
            confidence: 85,
        },
        IssueKind::Waste => UnifiedReport {
            detection: "WASTE / CLUTTER DETECTED".to_string(),
            category: Category::Cleanliness.as_str().to_string(),
            severity: event_severity(),
            risks: Category::Cleanliness.risks().to_string(),
            confidence: ((score * 2.5) as i32).min(95),
        },
        IssueKind::UnauthorizedAccess => UnifiedReport {
            detection: "UNAUTHORIZED ACCESS".to_string(),
            category: Category::Safety.as_str().to_string(),
            severity: Severity::High.title().to_string(),
            risks: Category::Safety.risks().to_string(),
            confidence: 90,
        },
        IssueKind::BrokenInfrastructure => UnifiedReport {
            detection: "BROKEN INFRASTRUCTURE".to_string(),
            category: Category::Infrastructure.as_str().to_string(),
            severity: event_severity(),
            risks: Category::Infrastructure.risks().to_string(),
            confidence: ((score * 100.0) as i32).min(95),
        },
        IssueKind::EnergyWaste => UnifiedReport {
            detection: "ENERGY WASTE".to_string(),
            category: Category::Electrical.as_str().to_string(),
            severity: Severity::Medium.title().to_string(),
            risks: Category::Electrical.risks().to_string(),
            confidence: 70,
        },
    }
}

/// Project an arbitration winner
pub fn for_candidate(candidate: &Candidate) -> UnifiedReport {
    standardize(
        candidate.kind,
        Some(candidate.event.severity),
        candidate.event.score,
    )
}
