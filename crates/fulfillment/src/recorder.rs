//! Appends events to the event log.

use domain::{EventPayload, EventRecord};
use record_store::{HookedStore, RecordStore};

use crate::error::Result;

/// Writes one event record per observed change.
///
/// The payload decides the `type` tag; the recorder only encodes and
/// persists it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRecorder;

impl EventRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Persists an event for `payload` and returns the stored record.
    ///
    /// Encoding failures abort the write before anything is persisted.
    #[tracing::instrument(skip_all)]
    pub async fn record<S: RecordStore + 'static>(
        &self,
        store: &HookedStore<S>,
        payload: impl Into<EventPayload>,
    ) -> Result<EventRecord> {
        let payload = payload.into();
        let kind = payload.kind();
        let event = EventRecord::from_payload(&payload)?;

        let stored = store.create(&event).await?;
        metrics::counter!("events_recorded_total", "type" => kind.as_str()).increment(1);
        tracing::debug!(
            event_type = %kind,
            subject_id = %payload.subject_id(),
            "event recorded"
        );

        Ok(stored)
    }
}
