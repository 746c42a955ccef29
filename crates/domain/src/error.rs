//! Domain error types.

use thiserror::Error;

/// Errors raised when reading a stage name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// The value is not one of the known stage names.
    #[error("Unknown {vocabulary} stage: '{value}'")]
    UnknownStage {
        vocabulary: &'static str,
        value: String,
    },
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A stage name could not be mapped.
    #[error("Status error: {0}")]
    Status(#[from] StatusError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
