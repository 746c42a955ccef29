//! Fulfillment error types.

use common::RecordId;
use domain::{DomainError, StatusError};
use record_store::StoreError;
use thiserror::Error;

/// Errors that can occur while recording events or propagating status.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// A read or write against the record store failed.
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// An event payload could not be encoded.
    #[error("Event encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    /// A stage could not be mapped.
    #[error("Status error: {0}")]
    Status(#[from] StatusError),

    /// The order an item belongs to does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(RecordId),
}

impl From<DomainError> for FulfillmentError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Status(err) => FulfillmentError::Status(err),
            DomainError::Serialization(err) => FulfillmentError::Encoding(err),
        }
    }
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
