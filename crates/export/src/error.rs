//! Export error types.

use chrono::{DateTime, Utc};
use record_store::StoreError;
use thiserror::Error;

/// Errors that can occur while building an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A range bound was not supplied.
    #[error("Missing '{0}' parameter")]
    MissingParameter(&'static str),

    /// A range bound is not an RFC 3339 timestamp.
    #[error("Invalid '{field}' datetime '{value}', use RFC 3339 format")]
    InvalidTimestamp { field: &'static str, value: String },

    /// The range ends before it starts.
    #[error("'start' ({start}) must not be after 'end' ({end})")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Reading records failed.
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// The report could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
