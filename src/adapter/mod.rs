//! Signal adapter boundary
//!
//! ## Responsibilities
//!
//! - Trait seam for the external vision detectors
//! - Per-session context pass-through (for adapters that keep
//!   previous-frame continuity)
//!
//! Adapters are stateless from the engine's point of view: each call gets
//! the frame and a context, and returns one normalized `RawSignal`. The
//! engine never holds a tracker lock while an adapter runs.

use crate::error::Result;
use crate::signal::{Frame, RawSignal, SignalKind};
use chrono::{DateTime, Utc};

/// Per-call context handed to every adapter
#[derive(Debug, Clone)]
pub struct AdapterContext {
    /// Session (camera) key scoping any adapter-internal continuity
    pub session_key: String,
    /// Observation timestamp for this call
    pub observed_at: DateTime<Utc>,
}

/// One external detector wrapped behind a uniform interface
pub trait SignalAdapter: Send + Sync {
    /// The signal kind this adapter produces
    fn kind(&self) -> SignalKind;

    /// Run detection on one frame. An `Err` excludes this kind for the
    /// call; the remaining kinds are unaffected.
    fn detect(&self, frame: &Frame, ctx: &AdapterContext) -> Result<RawSignal>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalPayload;

    struct FixedAdapter;

    impl SignalAdapter for FixedAdapter {
        fn kind(&self) -> SignalKind {
            SignalKind::Light
        }

        fn detect(&self, _frame: &Frame, ctx: &AdapterContext) -> Result<RawSignal> {
            Ok(RawSignal::new(
                true,
                SignalPayload::Light { lights_on: true },
                ctx.observed_at,
            ))
        }
    }

    #[test]
    fn test_adapter_receives_context() {
        let adapter = FixedAdapter;
        let ctx = AdapterContext {
            session_key: "cam1".to_string(),
            observed_at: Utc::now(),
        };
        let frame = Frame::new(64, 64, vec![0u8; 16]);
        let signal = adapter.detect(&frame, &ctx).unwrap();
        assert_eq!(signal.kind(), SignalKind::Light);
        assert_eq!(signal.observed_at, ctx.observed_at);
    }
}
