//! Error types for the gesture engine.
//!
//! The per-sample classification path is total: every well-formed sample is
//! processed without any error value. Errors exist only at construction
//! time (missing hardware, invalid configuration) and are surfaced exactly
//! once, never per-sample.

use thiserror::Error;

/// Errors surfaced by the gesture engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The host reported no gyroscope. The engine cannot classify twists
    /// without angular rate data; this is fatal at initialization.
    #[error("gyroscope unavailable: gesture classification requires angular rate data")]
    GyroscopeUnavailable,

    /// A configuration value is outside its usable range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
