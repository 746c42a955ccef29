//! JSON export download.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use export::{ExportRange, ExportReport};
use record_store::RecordStore;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ExportQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// GET /api/export-json?start=..&end=..: downloads `export.json`.
#[tracing::instrument(skip(state, query))]
pub async fn download<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = ExportRange::parse(query.start.as_deref(), query.end.as_deref())?;
    let report = ExportReport::build(state.store.records(), range).await?;
    let body = report.to_json_pretty()?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, r#"attachment; filename="export.json""#),
        ],
        body,
    ))
}
