//! Duration + cooldown confirmation tracker
//!
//! Confirms a condition only after it has held for a minimum duration,
//! then enforces a re-alert cooldown so a persistent condition does not
//! spam alerts. Observations are point-in-time samples; gaps between
//! calls count as elapsed wall-clock time.

use chrono::{DateTime, Duration, Utc};

/// Outcome of one duration-tracked observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationOutcome {
    /// Condition absent; confirmation timer cleared
    Idle,
    /// Condition present but not held long enough yet
    Arming { since: DateTime<Utc> },
    /// Condition held long enough but a recent alert suppresses this one
    InCooldown { remaining_secs: i64 },
    /// Confirmed; `confirmed_after_secs` is the time since the condition
    /// was first seen
    Confirmed { confirmed_after_secs: i64 },
}

#[derive(Debug)]
pub struct DurationCooldownTracker {
    first_seen_at: Option<DateTime<Utc>>,
    last_alert_at: Option<DateTime<Utc>>,
    confirm_duration: Duration,
    cooldown: Duration,
}

impl DurationCooldownTracker {
    /// A zero confirm duration confirms on the first qualifying
    /// observation; the cooldown still applies.
    pub fn new(confirm_duration_secs: i64, cooldown_secs: i64) -> Self {
        Self {
            first_seen_at: None,
            last_alert_at: None,
            confirm_duration: Duration::seconds(confirm_duration_secs),
            cooldown: Duration::seconds(cooldown_secs),
        }
    }

    /// Record one observation at `now` and return the confirmation outcome
    pub fn observe(&mut self, present: bool, now: DateTime<Utc>) -> DurationOutcome {
        if !present {
            self.first_seen_at = None;
            return DurationOutcome::Idle;
        }

        let since = *self.first_seen_at.get_or_insert(now);
        let elapsed = now - since;
        if elapsed < self.confirm_duration {
            return DurationOutcome::Arming { since };
        }

        if let Some(last_alert) = self.last_alert_at {
            let since_alert = now - last_alert;
            if since_alert < self.cooldown {
                return DurationOutcome::InCooldown {
                    remaining_secs: (self.cooldown - since_alert).num_seconds(),
                };
            }
        }

        self.last_alert_at = Some(now);
        DurationOutcome::Confirmed {
            confirmed_after_secs: elapsed.num_seconds(),
        }
    }

    pub fn reset(&mut self) {
        self.first_seen_at = None;
        self.last_alert_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_confirmation_requires_duration() {
        let mut t = DurationCooldownTracker::new(180, 180);
        assert!(matches!(t.observe(true, at(0)), DurationOutcome::Arming { .. }));
        assert!(matches!(t.observe(true, at(100)), DurationOutcome::Arming { .. }));
        assert_eq!(
            t.observe(true, at(180)),
            DurationOutcome::Confirmed {
                confirmed_after_secs: 180
            }
        );
    }

    #[test]
    fn test_absence_clears_timer() {
        let mut t = DurationCooldownTracker::new(180, 180);
        t.observe(true, at(0));
        assert_eq!(t.observe(false, at(100)), DurationOutcome::Idle);
        // Timer restarts from the next sighting
        assert!(matches!(
            t.observe(true, at(150)),
            DurationOutcome::Arming { .. }
        ));
        assert!(matches!(
            t.observe(true, at(300)),
            DurationOutcome::Arming { .. }
        ));
        assert!(matches!(
            t.observe(true, at(330)),
            DurationOutcome::Confirmed { .. }
        ));
    }

    #[test]
    fn test_cooldown_suppresses_realert() {
        // Confirm at t=180, suppressed at t=300, re-confirm at t=370
        let mut t = DurationCooldownTracker::new(180, 180);
        t.observe(true, at(0));
        assert!(matches!(
            t.observe(true, at(180)),
            DurationOutcome::Confirmed { .. }
        ));
        assert_eq!(
            t.observe(true, at(300)),
            DurationOutcome::InCooldown { remaining_secs: 60 }
        );
        assert!(matches!(
            t.observe(true, at(370)),
            DurationOutcome::Confirmed { .. }
        ));
    }

    #[test]
    fn test_zero_duration_confirms_immediately() {
        let mut t = DurationCooldownTracker::new(0, 180);
        assert_eq!(
            t.observe(true, at(0)),
            DurationOutcome::Confirmed {
                confirmed_after_secs: 0
            }
        );
        // Still within cooldown
        assert!(matches!(
            t.observe(true, at(60)),
            DurationOutcome::InCooldown { .. }
        ));
        // Past cooldown
        assert!(matches!(
            t.observe(true, at(181)),
            DurationOutcome::Confirmed { .. }
        ));
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut t = DurationCooldownTracker::new(0, 180);
        t.observe(true, at(0));
        t.reset();
        assert!(matches!(
            t.observe(true, at(10)),
            DurationOutcome::Confirmed { .. }
        ));
    }
}
