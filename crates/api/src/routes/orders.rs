//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::RecordId;
use domain::{Order, OrderItem, OrderItemStatus, OrderStatus, Product};
use fulfillment::StatusCoordinator;
use record_store::RecordStore;
use serde::{Deserialize, Serialize};

use super::{UpdateStatusRequest, parse_record_id};
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

// -- Handlers --

/// POST /api/orders: create an order together with its items.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let status = req
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?
        .unwrap_or_default();

    // Validate every item before writing anything
    let mut items = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let product = item.product.as_deref().map(parse_record_id).transpose()?;
        if let Some(product_id) = product {
            let exists: Option<Product> = state.store.fetch_optional(product_id).await?;
            if exists.is_none() {
                return Err(ApiError::BadRequest(format!(
                    "Product not found: {product_id}"
                )));
            }
        }
        let status = item
            .status
            .as_deref()
            .map(str::parse::<OrderItemStatus>)
            .transpose()?
            .unwrap_or_default();
        items.push((product, status));
    }

    let order = state.store.create(&Order::with_status(status)).await?;
    for (product, status) in items {
        let mut item = OrderItem::new(order.id).with_status(status);
        if let Some(product) = product {
            item = item.with_product(product);
        }
        state.store.create(&item).await?;
    }

    tracing::info!(order_id = %order.id, "order created");
    let response = load_order(&state, order.id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/orders/{id}: an order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_record_id(&id)?;
    Ok(Json(load_order(&state, order_id).await?))
}

/// PATCH /api/orders/{id}: set the order's status.
///
/// The response reflects the items after propagation.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_record_id(&id)?;
    let status: OrderStatus = req.status.parse()?;

    let mut order: Order = state
        .store
        .fetch_optional(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order not found: {order_id}")))?;
    order.status = status;
    state.store.update(&order).await?;

    Ok(Json(load_order(&state, order_id).await?))
}

async fn load_order<S: RecordStore + 'static>(
    state: &AppState<S>,
    order_id: RecordId,
) -> Result<OrderResponse, ApiError> {
    let order: Order = state
        .store
        .fetch_optional(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order not found: {order_id}")))?;
    let order_items = StatusCoordinator::items_of(&state.store, order_id).await?;

    Ok(OrderResponse { order, order_items })
}
