//! Rolling-average confirmation tracker
//!
//! Suppresses transient puddle detections by requiring a sustained mean
//! area over a bounded sample window. A person in the frame invalidates
//! any leak inference for the call and clears the window.

use std::collections::VecDeque;

/// Outcome of one rolling observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollingOutcome {
    /// Person present; window cleared, observation discarded
    PersonReset,
    /// Not enough samples yet
    Collecting { samples: usize },
    /// Enough samples but the mean is below the minimum area
    BelowThreshold { mean: f64 },
    /// Sustained mean above the minimum area
    Confirmed { mean: f64 },
}

/// Bounded FIFO score window with mean-based confirmation
#[derive(Debug)]
pub struct RollingAreaTracker {
    scores: VecDeque<f64>,
    capacity: usize,
    min_samples: usize,
    min_area: f64,
}

impl RollingAreaTracker {
    pub fn new(capacity: usize, min_samples: usize, min_area: f64) -> Self {
        Self {
            scores: VecDeque::with_capacity(capacity),
            capacity,
            min_samples,
            min_area,
        }
    }

    /// Record one observation and return the confirmation outcome
    pub fn observe(&mut self, area: f64, person_present: bool) -> RollingOutcome {
        if person_present {
            self.reset();
            return RollingOutcome::PersonReset;
        }

        if self.scores.len() >= self.capacity {
            self.scores.pop_front();
        }
        self.scores.push_back(area);

        if self.scores.len() < self.min_samples {
            return RollingOutcome::Collecting {
                samples: self.scores.len(),
            };
        }

        let mean = self.scores.iter().sum::<f64>() / self.scores.len() as f64;
        if mean < self.min_area {
            RollingOutcome::BelowThreshold { mean }
        } else {
            RollingOutcome::Confirmed { mean }
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn reset(&mut self) {
        self.scores.clear();
    }
}
