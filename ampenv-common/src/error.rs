//! Error types shared across the ampenv workspace
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the ampenv workspace
#[derive(Error, Debug)]
pub enum Error {
    /// Parameter validation failures, reported before a run starts
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Simulation worker errors (panic or internal failure in the producer task)
    #[error("Worker error: {0}")]
    Worker(String),

    /// Invalid state for operation (e.g. completing a cancelled run)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using the ampenv Error
pub type Result<T> = std::result::Result<T, Error>;
