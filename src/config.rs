//! Engine configuration
//!
//! All recognized tuning options for confirmation, severity, arbitration
//! and standardization. Defaults match the production constants; every
//! field can be overridden through environment variables or a JSON blob.

use crate::error::{Error, Result};
use crate::severity::SeverityBands;
use serde::{Deserialize, Serialize};

/// Which confirmation policy gates the water-leak verdict.
///
/// The two policies come from successive revisions of the leak pipeline;
/// rolling average is the default, duration+cooldown stays selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakConfirmationPolicy {
    RollingAverage,
    DurationCooldown,
}

impl Default for LeakConfirmationPolicy {
    fn default() -> Self {
        Self::RollingAverage
    }
}

/// How energy-waste signals behave while the room is (recently) occupied.
///
/// `SuppressWhileOccupied` gates on the absence tracker only.
/// `ExcludeWhileOccupied` additionally drops the candidate whenever a
/// person is present in the current call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupiedEnergyPolicy {
    SuppressWhileOccupied,
    ExcludeWhileOccupied,
}

impl Default for OccupiedEnergyPolicy {
    fn default() -> Self {
        Self::SuppressWhileOccupied
    }
}

/// Permitted-access window for the unauthorized-presence check.
///
/// Hours are compared against the observation timestamp's clock.
/// Overnight windows (e.g. 22 -> 6) are supported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccessWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for AccessWindow {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 18,
        }
    }
}

impl AccessWindow {
    pub fn validate(&self) -> Result<()> {
        if self.start_hour > 23 || self.end_hour > 23 {
            return Err(Error::Config(format!(
                "access window hours must be 0-23, got {}-{}",
                self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }

    /// True when the given hour falls inside the permitted window
    pub fn permits(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            self.start_hour <= hour && hour < self.end_hour
        } else {
            // Overnight window like 22 -> 6
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    pub fn is_restricted(&self, hour: u32) -> bool {
        !self.permits(hour)
    }
}

/// Per-kind arbitration rule: fixed priority (1 = highest) and an optional
/// score gate applied on top of base confirmation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArbitrationRule {
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

/// Arbitration rule table, one entry per issue kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrationRules {
    pub water_leak: ArbitrationRule,
    pub unauthorized_access: ArbitrationRule,
    pub broken_infrastructure: ArbitrationRule,
    pub waste: ArbitrationRule,
    pub energy_waste: ArbitrationRule,
}

impl Default for ArbitrationRules {
    fn default() -> Self {
        Self {
            water_leak: ArbitrationRule {
                priority: 1,
                min_score: None,
            },
            unauthorized_access: ArbitrationRule {
                priority: 2,
                min_score: None,
            },
            broken_infrastructure: ArbitrationRule {
                priority: 3,
                min_score: Some(0.55),
            },
            waste: ArbitrationRule {
                priority: 4,
                min_score: Some(25.0),
            },
            energy_waste: ArbitrationRule {
                priority: 5,
                min_score: None,
            },
        }
    }
}

/// Per-kind severity breakpoint tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityConfig {
    /// Rolling mean puddle area (px2)
    pub water_area: SeverityBands,
    /// Clutter score
    pub waste_score: SeverityBands,
    /// Detected waste object count
    pub waste_objects: SeverityBands,
    /// Damage score in [0, 1]; the medium breakpoint doubles as the base
    /// confirmation floor for the kind
    pub infrastructure_damage: SeverityBands,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            water_area: SeverityBands::new(600.0, 1200.0),
            waste_score: SeverityBands::new(18.0, 28.0),
            waste_objects: SeverityBands::new(3.0, 6.0),
            infrastructure_damage: SeverityBands::new(0.5, 0.7),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a condition must hold before a duration-tracked kind confirms
    pub confirm_duration_secs: i64,
    /// Re-alert cooldown for confirmed-alert kinds
    pub alert_cooldown_secs: i64,
    /// Rolling score window capacity (FIFO eviction beyond this)
    pub rolling_window_capacity: usize,
    /// Minimum samples before a rolling-average verdict may be emitted
    pub min_samples: usize,
    /// Rolling mean area below this never confirms a leak
    pub min_leak_area: f64,
    /// Room must be person-free this long before energy-waste is eligible
    pub empty_room_threshold_secs: i64,
    /// Permitted-access hours for the unauthorized-presence check
    pub access_window: AccessWindow,
    pub leak_policy: LeakConfirmationPolicy,
    pub occupied_energy_policy: OccupiedEnergyPolicy,
    pub severity: SeverityConfig,
    pub arbitration: ArbitrationRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confirm_duration_secs: 180,
            alert_cooldown_secs: 180,
            rolling_window_capacity: 10,
            min_samples: 4,
            min_leak_area: 250.0,
            empty_room_threshold_secs: 300,
            access_window: AccessWindow::default(),
            leak_policy: LeakConfirmationPolicy::default(),
            occupied_energy_policy: OccupiedEnergyPolicy::default(),
            severity: SeverityConfig::default(),
            arbitration: ArbitrationRules::default(),
        }
    }
}

impl EngineConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_i64("IS23_CONFIRM_DURATION_SEC") {
            config.confirm_duration_secs = v;
        }
        if let Some(v) = env_i64("IS23_ALERT_COOLDOWN_SEC") {
            config.alert_cooldown_secs = v;
        }
        if let Some(v) = env_usize("IS23_ROLLING_WINDOW") {
            config.rolling_window_capacity = v;
        }
        if let Some(v) = env_usize("IS23_MIN_SAMPLES") {
            config.min_samples = v;
        }
        if let Some(v) = env_f64("IS23_MIN_LEAK_AREA") {
            config.min_leak_area = v;
        }
        if let Some(v) = env_i64("IS23_EMPTY_ROOM_SEC") {
            config.empty_room_threshold_secs = v;
        }
        if let Some(v) = env_u32("IS23_ACCESS_START_HOUR") {
            config.access_window.start_hour = v;
        }
        if let Some(v) = env_u32("IS23_ACCESS_END_HOUR") {
            config.access_window.end_hour = v;
        }

        config
    }

    /// Parse from a JSON settings blob and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range or inconsistent parameters before any detector
    /// or tracker is invoked
    pub fn validate(&self) -> Result<()> {
        self.access_window.validate()?;

        if self.rolling_window_capacity == 0 {
            return Err(Error::Config(
                "rolling_window_capacity must be at least 1".to_string(),
            ));
        }
        if self.min_samples == 0 || self.min_samples > self.rolling_window_capacity {
            return Err(Error::Config(format!(
                "min_samples {} must be within 1..={}",
                self.min_samples, self.rolling_window_capacity
            )));
        }
        if !self.min_leak_area.is_finite() || self.min_leak_area <= 0.0 {
            return Err(Error::Config(format!(
                "min_leak_area must be positive, got {}",
                self.min_leak_area
            )));
        }
        if self.confirm_duration_secs < 0 || self.alert_cooldown_secs < 0 {
            return Err(Error::Config(
                "confirmation and cooldown durations must be non-negative".to_string(),
            ));
        }
        if self.empty_room_threshold_secs < 0 {
            return Err(Error::Config(
                "empty_room_threshold_secs must be non-negative".to_string(),
            ));
        }

        self.severity.water_area.validate("water_area")?;
        self.severity.waste_score.validate("waste_score")?;
        self.severity.waste_objects.validate("waste_objects")?;
        self.severity
            .infrastructure_damage
            .validate("infrastructure_damage")?;

        Ok(())
    }
}

fn env_i64(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
