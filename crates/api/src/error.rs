//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::StatusError;
use export::ExportError;
use fulfillment::FulfillmentError;
use record_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Record store error, including failed hooks.
    Store(StoreError),
    /// Export error.
    Export(ExportError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Export(err) => export_error_to_response(err),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::Duplicate { .. } | StoreError::AppendOnly(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn export_error_to_response(err: ExportError) -> (StatusCode, String) {
    match err {
        ExportError::MissingParameter(_)
        | ExportError::InvalidTimestamp { .. }
        | ExportError::InvalidRange { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        ExportError::Store(err) => store_error_to_response(err),
        ExportError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Export(err)
    }
}

impl From<StatusError> for ApiError {
    fn from(err: StatusError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        match err {
            FulfillmentError::Store(err) => ApiError::Store(err),
            FulfillmentError::Status(err) => err.into(),
            FulfillmentError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),
            FulfillmentError::Encoding(_) => ApiError::Internal(err.to_string()),
        }
    }
}
