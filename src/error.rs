//! PromptShield error types

use thiserror::Error;

/// PromptShield error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Policy table error (e.g. an invalid blocked pattern)
    #[error("Policy error: {0}")]
    Policy(String),

    /// Injection detector error
    #[error("Detection error: {0}")]
    Detection(String),

    /// Content sanitizer error
    #[error("Sanitizer error: {0}")]
    Sanitize(String),

    /// Memory classification error
    #[error("Memory error: {0}")]
    Memory(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for PromptShield operations
pub type Result<T> = std::result::Result<T, Error>;
