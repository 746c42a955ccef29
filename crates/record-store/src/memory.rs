use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::record::{CREATED_FIELD, UPDATED_FIELD, record_id};
use crate::{
    Collection, Fields, RecordFilter, RecordId, RecordStore, Replaced, Result, StoreError,
};

#[derive(Debug, Clone)]
struct StoredRecord {
    id: RecordId,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    fields: Fields,
}

impl StoredRecord {
    fn snapshot(&self) -> Result<Fields> {
        let mut fields = self.fields.clone();
        fields.insert(CREATED_FIELD.to_string(), serde_json::to_value(self.created)?);
        fields.insert(UPDATED_FIELD.to_string(), serde_json::to_value(self.updated)?);
        Ok(fields)
    }
}

#[derive(Debug, Default)]
struct FailurePlan {
    collections: HashSet<Collection>,
    records: HashSet<RecordId>,
}

impl FailurePlan {
    fn check(&self, collection: Collection, id: RecordId) -> Result<()> {
        if self.collections.contains(&collection) || self.records.contains(&id) {
            return Err(StoreError::Unavailable(format!(
                "write to {collection} {id} refused"
            )));
        }
        Ok(())
    }
}

/// In-memory record store implementation for testing and local runs.
///
/// Records are kept per collection in insertion order. Writes can be made
/// to fail on demand to exercise error paths.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<StoredRecord>>>>,
    failures: Arc<RwLock<FailurePlan>>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory record store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records in a collection.
    pub async fn record_count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }

    /// Makes every write to `collection` fail while `fail` is set.
    pub async fn set_fail_on_collection(&self, collection: Collection, fail: bool) {
        let mut failures = self.failures.write().await;
        if fail {
            failures.collections.insert(collection);
        } else {
            failures.collections.remove(&collection);
        }
    }

    /// Makes every write to the record `id` fail while `fail` is set.
    pub async fn set_fail_on_record(&self, id: RecordId, fail: bool) {
        let mut failures = self.failures.write().await;
        if fail {
            failures.records.insert(id);
        } else {
            failures.records.remove(&id);
        }
    }

    /// Clears all records and injected failures.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
        *self.failures.write().await = FailurePlan::default();
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, collection: Collection, mut fields: Fields) -> Result<Fields> {
        let id = record_id(collection, &fields)?;
        self.failures.read().await.check(collection, id)?;

        fields.remove(CREATED_FIELD);
        fields.remove(UPDATED_FIELD);

        let mut store = self.collections.write().await;
        let records = store.entry(collection).or_default();
        if records.iter().any(|r| r.id == id) {
            return Err(StoreError::Duplicate { collection, id });
        }

        let now = Utc::now();
        let record = StoredRecord {
            id,
            created: now,
            updated: now,
            fields,
        };
        let snapshot = record.snapshot()?;
        records.push(record);

        Ok(snapshot)
    }

    async fn replace(&self, collection: Collection, mut fields: Fields) -> Result<Replaced> {
        let id = record_id(collection, &fields)?;
        self.failures.read().await.check(collection, id)?;

        fields.remove(CREATED_FIELD);
        fields.remove(UPDATED_FIELD);

        let mut store = self.collections.write().await;
        let record = store
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or(StoreError::NotFound { collection, id })?;

        let previous = record.snapshot()?;
        record.fields = fields;
        record.updated = Utc::now();
        Ok(Replaced {
            previous,
            current: record.snapshot()?,
        })
    }

    async fn find_by_id(&self, collection: Collection, id: RecordId) -> Result<Option<Fields>> {
        let store = self.collections.read().await;
        store
            .get(&collection)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .map(StoredRecord::snapshot)
            .transpose()
    }

    async fn find_by_filter(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Vec<Fields>> {
        let store = self.collections.read().await;
        let Some(records) = store.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<&StoredRecord> = records
            .iter()
            .filter(|r| filter.matches(&r.fields, r.created))
            .collect();

        // Stable sort keeps insertion order for equal timestamps
        matching.sort_by_key(|r| r.created);

        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(usize::MAX);

        matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(StoredRecord::snapshot)
            .collect()
    }
}
