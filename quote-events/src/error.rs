//! Error types for quote events

use thiserror::Error;

/// Quote event error
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Envelope does not match its event type
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Sink rejected the event
    #[error("Sink error: {0}")]
    Sink(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
