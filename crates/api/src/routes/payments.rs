//! Payment and payment option endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{Payment, PaymentOption};
use record_store::{RecordFilter, RecordStore};
use serde::Deserialize;

use super::parse_record_id;
use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreatePaymentOptionRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub payment_option: String,
    #[serde(default)]
    pub order: Option<String>,
}

/// POST /api/payment-options
#[tracing::instrument(skip(state, req))]
pub async fn create_option<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreatePaymentOptionRequest>,
) -> Result<(StatusCode, Json<PaymentOption>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Payment option name is required".to_string(),
        ));
    }
    let option = state.store.create(&PaymentOption::new(req.name)).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// GET /api/payment-options
#[tracing::instrument(skip(state))]
pub async fn list_options<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<PaymentOption>>, ApiError> {
    Ok(Json(state.store.fetch_all(&RecordFilter::new()).await?))
}

/// POST /api/payments: the option and the order, if given, must exist.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let mut payment = Payment::new(parse_record_id(&req.payment_option)?);
    if let Some(order) = req.order.as_deref() {
        payment = payment.for_order(parse_record_id(order)?);
    }
    let payment = state.store.create(&payment).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
