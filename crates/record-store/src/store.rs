use async_trait::async_trait;

use crate::record::{from_fields, to_fields};
use crate::{Collection, Fields, Record, RecordFilter, RecordId, Result, StoreError};

/// The outcome of a replace.
#[derive(Debug, Clone, PartialEq)]
pub struct Replaced {
    /// The stored snapshot that was overwritten.
    pub previous: Fields,
    /// The stored snapshot after the write.
    pub current: Fields,
}

/// Core trait for record store implementations.
///
/// A record store persists JSON field maps per collection. It assigns the
/// `created` and `updated` timestamps and serializes individual record
/// writes, but offers no multi-record transactions.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a new record.
    ///
    /// Fails with `Duplicate` if a record with the same id exists.
    /// Returns the stored snapshot including the assigned timestamps.
    async fn insert(&self, collection: Collection, fields: Fields) -> Result<Fields>;

    /// Replaces an existing record's fields.
    ///
    /// The original `created` timestamp is kept; `updated` is refreshed.
    /// The snapshot being overwritten is read in the same step as the
    /// write, so concurrent replaces of one record each see the state the
    /// other left behind. Fails with `NotFound` if the record does not exist.
    async fn replace(&self, collection: Collection, fields: Fields) -> Result<Replaced>;

    /// Retrieves a single record by id.
    async fn find_by_id(&self, collection: Collection, id: RecordId) -> Result<Option<Fields>>;

    /// Retrieves every record matching a filter, oldest first.
    async fn find_by_filter(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Vec<Fields>>;
}

/// Typed convenience methods for record stores.
#[async_trait]
pub trait RecordStoreExt: RecordStore {
    /// Loads a typed record, failing with `NotFound` if it is absent.
    async fn fetch<R: Record>(&self, id: RecordId) -> Result<R> {
        self.fetch_optional(id)
            .await?
            .ok_or(StoreError::NotFound {
                collection: R::COLLECTION,
                id,
            })
    }

    /// Loads a typed record if it exists.
    async fn fetch_optional<R: Record>(&self, id: RecordId) -> Result<Option<R>> {
        match self.find_by_id(R::COLLECTION, id).await? {
            Some(fields) => Ok(Some(from_fields(fields)?)),
            None => Ok(None),
        }
    }

    /// Loads every typed record matching a filter, oldest first.
    async fn fetch_all<R: Record>(&self, filter: &RecordFilter) -> Result<Vec<R>> {
        self.find_by_filter(R::COLLECTION, filter)
            .await?
            .into_iter()
            .map(from_fields)
            .collect()
    }

    /// Inserts a typed record without running any hooks.
    async fn insert_record<R: Record>(&self, record: &R) -> Result<R> {
        let stored = self.insert(R::COLLECTION, to_fields(record)?).await?;
        from_fields(stored)
    }
}

// Blanket implementation for all RecordStore implementations
impl<T: RecordStore + ?Sized> RecordStoreExt for T {}
