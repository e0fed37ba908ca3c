//! Room-occupancy tracker for energy-waste eligibility
//!
//! Tracks when a person was last seen. Energy-waste signals (lights/fan
//! running) only become eligible once the room has been person-free for
//! the configured threshold.

use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct OccupancyTracker {
    last_person_seen_at: Option<DateTime<Utc>>,
    empty_threshold_secs: i64,
}

impl OccupancyTracker {
    pub fn new(empty_threshold_secs: i64) -> Self {
        Self {
            last_person_seen_at: None,
            empty_threshold_secs,
        }
    }

    /// Record one observation. The first observation also seeds the
    /// baseline, so a session starts out counted as just-occupied.
    pub fn observe(&mut self, person_present: bool, now: DateTime<Utc>) {
        if person_present || self.last_person_seen_at.is_none() {
            self.last_person_seen_at = Some(now);
        }
    }

    /// True once the room has been person-free past the threshold
    pub fn empty_long_enough(&self, now: DateTime<Utc>) -> bool {
        match self.last_person_seen_at {
            Some(seen) => (now - seen).num_seconds() > self.empty_threshold_secs,
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.last_person_seen_at = None;
    }
}
