//! Error types for the Sciray engine
//!
//! This module defines the error types used throughout the engine,
//! including input validation, lookups, backend synchronization and
//! engine initialization.

use std::fmt;

/// Result type for Sciray engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Sciray engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Malformed input to a setter (frame size below minimum, empty color ramp, etc.)
    InvalidArgument(String),

    /// Lookup failure (unknown model id, missing component, unknown type name, etc.)
    NotFound(String),

    /// Backend-specific error (device call failed, lock poisoned, etc.)
    BackendError(String),

    /// Initialization failed (engine, device, subsystems)
    InitializationFailed(String),

    /// JSON (de)serialization failed
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Serialization(error.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
