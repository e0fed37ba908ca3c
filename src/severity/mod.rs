//! Severity classification
//!
//! Maps a confirmed signal's numeric score into an ordinal severity using
//! per-kind breakpoint tables. Breakpoints are configuration, not detector
//! code, so they can be tuned without touching control flow.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal severity of a confirmed signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Title-cased label used by the unified output schema
    pub fn title(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Ascending breakpoints for one score dimension.
///
/// `score <= medium` is Low, `score <= high` is Medium, above is High.
/// A total, monotonic step function: a strictly increasing score never
/// lowers the classified severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeverityBands {
    pub medium: f64,
    pub high: f64,
}

impl SeverityBands {
    pub fn new(medium: f64, high: f64) -> Self {
        Self { medium, high }
    }

    pub fn classify(&self, score: f64) -> Severity {
        if score > self.high {
            Severity::High
        } else if score > self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.medium.is_finite() || !self.high.is_finite() {
            return Err(Error::Config(format!(
                "{}: severity breakpoints must be finite",
                name
            )));
        }
        if self.medium >= self.high {
            return Err(Error::Config(format!(
                "{}: medium breakpoint {} must be below high breakpoint {}",
                name, self.medium, self.high
            )));
        }
        Ok(())
    }
}

/// Waste severity is two-dimensional: the clutter score and the detected
/// object count each have their own bands, and the stronger one wins.
pub fn classify_waste(
    score_bands: &SeverityBands,
    object_bands: &SeverityBands,
    clutter_score: f64,
    object_count: u32,
) -> Severity {
    score_bands
        .classify(clutter_score)
        .max(object_bands.classify(object_count as f64))
}
