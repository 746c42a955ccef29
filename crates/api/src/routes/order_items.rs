//! Order item endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{OrderItem, OrderItemStatus};
use record_store::RecordStore;

use super::{UpdateStatusRequest, parse_record_id};
use crate::AppState;
use crate::error::ApiError;

/// GET /api/order-items/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderItem>, ApiError> {
    let item_id = parse_record_id(&id)?;
    let item = state
        .store
        .fetch_optional(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order item not found: {item_id}")))?;
    Ok(Json(item))
}

/// PATCH /api/order-items/{id}: set the item's status.
///
/// A failing hook (for example the event write) is reported as an error
/// even though the item itself was saved.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderItem>, ApiError> {
    let item_id = parse_record_id(&id)?;
    let status: OrderItemStatus = req.status.parse()?;

    let mut item: OrderItem = state
        .store
        .fetch_optional(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order item not found: {item_id}")))?;
    item.status = status;
    let item = state.store.update(&item).await?;

    Ok(Json(item))
}
