pub mod events;
pub mod export;
pub mod health;
pub mod metrics;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;

use common::RecordId;
use serde::Deserialize;

use crate::error::ApiError;

/// Body of the status `PATCH` endpoints.
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn parse_record_id(id: &str) -> Result<RecordId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
