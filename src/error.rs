//! Error types module.
//!
//! This module defines the error types used throughout the dnsprobe crate.
//! It uses `thiserror` for structured error handling and provides
//! a custom `Result` type alias for convenience.
//!
//! Probe-level failures (timeouts, missing records) are never represented
//! here; they are captured as [`crate::dns::ProbeResult`] values.

use thiserror::Error;

/// A specialized `Result` type for dnsprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for dnsprobe.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (history store, catalog files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error (invalid values, missing files)
    #[error("Config error: {0}")]
    Config(String),

    /// Parse error (invalid resolver address, malformed catalog line)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Fault inside the scheduling machinery; fatal to the run
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl Error {
    /// Create a new configuration error with a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new parse error with a message.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_panic() {
            Self::Scheduler(format!("resolver task panicked: {e}"))
        } else {
            Self::Scheduler(format!("resolver task cancelled: {e}"))
        }
    }
}
