//! IS23 Fusion Engine
//!
//! Turns several independent, frequently-wrong scene detectors into one
//! trustworthy, non-contradictory verdict per image, with memory of recent
//! history so transient noise does not trigger false alarms and repeated
//! true conditions do not spam alerts.
//!
//! ## Architecture (7 components)
//!
//! 1. Signal model - normalized `RawSignal` per detector kind
//! 2. SignalAdapter - trait seam for the external vision detectors
//! 3. Confirmation - per-session temporal trackers (rolling average,
//!    duration+cooldown, occupancy)
//! 4. Severity - per-kind breakpoint classification
//! 5. Arbitration - priority/confidence selection of one candidate
//! 6. Report - standardization into the unified external schema
//! 7. FusionEngine - per-call pipeline and session lifecycle
//!
//! ## Design Principles
//!
//! - Keyed temporal state: trackers live in an explicit per-session store,
//!   never in ambient globals
//! - At most one verdict per call; "no issue" is a valid terminal verdict
//! - One failing detector degrades to fewer candidates, never a failed call

pub mod adapter;
pub mod arbitration;
pub mod config;
pub mod confirmation;
pub mod engine;
pub mod error;
pub mod report;
pub mod severity;
pub mod signal;

pub use config::EngineConfig;
pub use engine::{AnalyzeRequest, AnalyzeResponse, FusionEngine};
pub use error::{Error, Result};
