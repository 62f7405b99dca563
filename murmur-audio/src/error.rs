//! Common error types for the audio orchestrator
//!
//! No variant here ever crosses the event surface: backend and ducking
//! failures are logged at the point of detection and degrade to a no-op or
//! partial completion.

use thiserror::Error;

/// Common result type for orchestrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Orchestrator error types
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend operation raised or reported failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// The external duck/restore mechanism failed
    #[error("Ducking error: {0}")]
    Ducking(String),
}
