//! Product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::Product;
use record_store::{RecordFilter, RecordStore};
use serde::Deserialize;

use super::parse_record_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// POST /api/products
#[tracing::instrument(skip(state, req))]
pub async fn create<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Product name is required".to_string()));
    }
    let product = state
        .store
        .create(&Product::new(req.name, req.is_available))
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products
#[tracing::instrument(skip(state))]
pub async fn list<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.store.fetch_all(&RecordFilter::new()).await?))
}

/// PATCH /api/products/{id}: rename or change availability.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let product_id = parse_record_id(&id)?;
    let mut product: Product = state
        .store
        .fetch_optional(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {product_id}")))?;

    if let Some(name) = req.name {
        product.name = name;
    }
    if let Some(is_available) = req.is_available {
        product.is_available = is_available;
    }

    Ok(Json(state.store.update(&product).await?))
}
