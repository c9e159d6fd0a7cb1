//! Error types for credit engine

use thiserror::Error;

/// Credit engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid credit profile
    #[error("Invalid credit profile: {0}")]
    InvalidProfile(String),

    /// I/O error while loading a policy file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
