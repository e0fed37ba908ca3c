//! Signal model - normalized detector output
//!
//! ## Responsibilities
//!
//! - Uniform `RawSignal` record for heterogeneous detector outputs
//! - One concrete payload shape per signal kind (tagged variant)
//! - Boundary validation before any signal reaches the trackers
//! - Frame dimensional validation

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum accepted frame side length in pixels
pub const MIN_FRAME_SIDE: u32 = 2;

/// One category of detectable input signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Water,
    Waste,
    Person,
    Light,
    Fan,
    Infrastructure,
}

impl SignalKind {
    /// All signal kinds, in adapter invocation order
    pub const ALL: [SignalKind; 6] = [
        SignalKind::Water,
        SignalKind::Waste,
        SignalKind::Person,
        SignalKind::Light,
        SignalKind::Fan,
        SignalKind::Infrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Water => "water",
            SignalKind::Waste => "waste",
            SignalKind::Person => "person",
            SignalKind::Light => "light",
            SignalKind::Fan => "fan",
            SignalKind::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reportable issue kind (the verdict vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    WaterLeak,
    UnauthorizedAccess,
    BrokenInfrastructure,
    Waste,
    EnergyWaste,
}

impl IssueKind {
    /// All issue kinds, in arbitration priority order
    pub const ALL: [IssueKind; 5] = [
        IssueKind::WaterLeak,
        IssueKind::UnauthorizedAccess,
        IssueKind::BrokenInfrastructure,
        IssueKind::Waste,
        IssueKind::EnergyWaste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::WaterLeak => "water_leak",
            IssueKind::UnauthorizedAccess => "unauthorized_access",
            IssueKind::BrokenInfrastructure => "broken_infrastructure",
            IssueKind::Waste => "waste",
            IssueKind::EnergyWaste => "energy_waste",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific detector payload.
///
/// Score units are per kind: puddle area in px2, clutter score in detector
/// units, damage score and pose confidence in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalPayload {
    Water { area: f64, puddle_count: u32 },
    Waste { clutter_score: f64, object_count: u32 },
    Person { pose_confidence: f64 },
    Light { lights_on: bool },
    Fan { fan_running: bool },
    Infrastructure { damage_score: f64, broken_items: u32 },
}

impl SignalPayload {
    pub fn kind(&self) -> SignalKind {
        match self {
            SignalPayload::Water { .. } => SignalKind::Water,
            SignalPayload::Waste { .. } => SignalKind::Waste,
            SignalPayload::Person { .. } => SignalKind::Person,
            SignalPayload::Light { .. } => SignalKind::Light,
            SignalPayload::Fan { .. } => SignalKind::Fan,
            SignalPayload::Infrastructure { .. } => SignalKind::Infrastructure,
        }
    }
}

/// Normalized detector output, produced fresh on every call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    /// Whether the underlying condition was observed in this frame
    pub present: bool,
    /// Kind-specific payload
    pub payload: SignalPayload,
    /// Observation timestamp
    pub observed_at: DateTime<Utc>,
    /// Adapter-specific extras (kept opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

impl RawSignal {
    /// Create a signal with no extra attributes
    pub fn new(present: bool, payload: SignalPayload, observed_at: DateTime<Utc>) -> Self {
        Self {
            present,
            payload,
            observed_at,
            attributes: None,
        }
    }

    pub fn kind(&self) -> SignalKind {
        self.payload.kind()
    }

    /// Kind-specific numeric score (booleans project to 1.0 / 0.0)
    pub fn score(&self) -> f64 {
        match &self.payload {
            SignalPayload::Water { area, .. } => *area,
            SignalPayload::Waste { clutter_score, .. } => *clutter_score,
            SignalPayload::Person { pose_confidence } => *pose_confidence,
            SignalPayload::Light { lights_on } => {
                if *lights_on {
                    1.0
                } else {
                    0.0
                }
            }
            SignalPayload::Fan { fan_running } => {
                if *fan_running {
                    1.0
                } else {
                    0.0
                }
            }
            SignalPayload::Infrastructure { damage_score, .. } => *damage_score,
        }
    }

    /// Boundary validation. Invalid signals are an adapter failure: the
    /// kind is excluded for the call, never fatal.
    pub fn validate(&self) -> Result<()> {
        let score = self.score();
        if !score.is_finite() || score < 0.0 {
            return Err(Error::Adapter {
                kind: self.kind(),
                message: format!("non-finite or negative score: {}", score),
            });
        }

        match &self.payload {
            SignalPayload::Infrastructure { damage_score, .. } => {
                if *damage_score > 1.0 {
                    return Err(Error::Adapter {
                        kind: SignalKind::Infrastructure,
                        message: format!("damage_score out of range: {}", damage_score),
                    });
                }
            }
            SignalPayload::Person { pose_confidence } => {
                if *pose_confidence > 1.0 {
                    return Err(Error::Adapter {
                        kind: SignalKind::Person,
                        message: format!("pose_confidence out of range: {}", pose_confidence),
                    });
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// Decoded image handed to the engine.
///
/// Decoding is the caller's concern; the engine only checks dimensions.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Dimensional validation; fatal to the call when it fails
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_FRAME_SIDE || self.height < MIN_FRAME_SIDE {
            return Err(Error::InvalidInput(format!(
                "frame dimensions {}x{} below minimum {}px",
                self.width, self.height, MIN_FRAME_SIDE
            )));
        }
        if self.data.is_empty() {
            return Err(Error::InvalidInput("frame has no pixel data".to_string()));
        }
        Ok(())
    }
}
