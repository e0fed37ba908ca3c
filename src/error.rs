//! Error handling for the IS23 Fusion Engine

use crate::signal::SignalKind;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame absent, undecodable, or dimensionally invalid.
    /// Fatal to the call; no tracker state is mutated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Out-of-range or inconsistent configuration. Rejected before any
    /// detector or tracker is invoked.
    #[error("Config error: {0}")]
    Config(String),

    /// One signal's detector call errored or returned an invalid value.
    /// Recovered locally: the kind is excluded for the call.
    #[error("Adapter error for {kind}: {message}")]
    Adapter { kind: SignalKind, message: String },

    /// Defensive case (e.g. malformed confirmed event). Logged, candidate
    /// dropped, arbitration proceeds with the rest.
    #[error("Arbitration error: {0}")]
    Arbitration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable error code for logs and diagnostics payloads
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Adapter { .. } => "ADAPTER_ERROR",
            Error::Arbitration(_) => "ARBITRATION_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error is surfaced to the caller as the call's outcome.
    /// Adapter and arbitration failures degrade to fewer candidates instead.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::Config(_))
    }
}
