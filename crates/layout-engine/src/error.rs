//! Error types for the layout engine
//!
//! Malformed user input never reaches these variants: it is normalized to a
//! safe default where it enters the engine. Errors here are reserved for
//! faults of the storage and compression layers.

use thiserror::Error;

/// Result type alias using LayoutEngineError
pub type Result<T> = std::result::Result<T, LayoutEngineError>;

/// Errors that can occur in the layout engine
#[derive(Debug, Error)]
pub enum LayoutEngineError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// Configuration could not be used
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayoutEngineError {
    /// Create a configuration error with a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
