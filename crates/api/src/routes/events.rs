//! Event log endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use common::RecordId;
use domain::EventRecord;
use record_store::{RecordFilter, RecordStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;
use crate::error::ApiError;

const DEFAULT_LIMIT: usize = 500;

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Serialize)]
pub struct EventResponse {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub content: Value,
    pub created: Option<DateTime<Utc>>,
}

impl From<EventRecord> for EventResponse {
    fn from(event: EventRecord) -> Self {
        let content = serde_json::from_str(&event.content)
            .unwrap_or_else(|_| Value::String(event.content.clone()));
        Self {
            id: event.id,
            event_type: event.event_type,
            content,
            created: event.created,
        }
    }
}

/// GET /api/events: the event log, oldest first.
#[tracing::instrument(skip(state, query))]
pub async fn list<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let mut filter = RecordFilter::new()
        .limit(query.limit.unwrap_or(DEFAULT_LIMIT))
        .offset(query.offset.unwrap_or(0));
    if let Some(event_type) = query.event_type {
        filter = filter.field_eq("type", event_type);
    }

    let events: Vec<EventRecord> = state.store.fetch_all(&filter).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}
