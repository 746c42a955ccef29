use thiserror::Error;

use crate::hooks::{HookError, HookOperation};
use crate::{Collection, RecordId};

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id exists in the collection.
    #[error("Record not found: {collection} {id}")]
    NotFound { collection: Collection, id: RecordId },

    /// A record with this id already exists in the collection.
    #[error("Record already exists: {collection} {id}")]
    Duplicate { collection: Collection, id: RecordId },

    /// The write was rejected by the collection schema.
    #[error("Validation failed for {collection}: {message}")]
    Validation {
        collection: Collection,
        message: String,
    },

    /// An update was attempted on an append-only collection.
    #[error("Collection {0} is append-only")]
    AppendOnly(Collection),

    /// A hook failed after the primary write was committed.
    #[error("Hook '{hook}' failed after {operation} on {collection}: {source}")]
    Hook {
        hook: &'static str,
        operation: HookOperation,
        collection: Collection,
        #[source]
        source: HookError,
    },

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
