//! After-commit hook dispatch.
//!
//! `HookedStore` wraps a `RecordStore` and runs the hooks registered for a
//! collection once a create or update has been committed. Hooks receive the
//! dispatcher itself through `RecordEvent::store`, so writes issued from a
//! hook re-enter the dispatcher and trigger further hooks. Termination of
//! such chains is the responsibility of the hooks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::record::{from_fields, to_fields};
use crate::{
    Collection, Fields, Record, RecordFilter, RecordId, RecordStore, RecordStoreExt, Replaced,
    Result, StoreError,
};

/// Error type returned by hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by hooks.
pub type HookResult = std::result::Result<(), HookError>;

/// The kind of write that triggered a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOperation {
    Create,
    Update,
}

impl std::fmt::Display for HookOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookOperation::Create => f.write_str("create"),
            HookOperation::Update => f.write_str("update"),
        }
    }
}

/// A committed write, as seen by a hook.
pub struct RecordEvent<'a, S: RecordStore> {
    store: &'a HookedStore<S>,
    operation: HookOperation,
    collection: Collection,
    record: Fields,
    original: Option<Fields>,
}

impl<'a, S: RecordStore> RecordEvent<'a, S> {
    /// The dispatcher that committed the write. Writes through it run hooks.
    pub fn store(&self) -> &'a HookedStore<S> {
        self.store
    }

    pub fn operation(&self) -> HookOperation {
        self.operation
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// The committed snapshot.
    pub fn fields(&self) -> &Fields {
        &self.record
    }

    /// The snapshot before the write. `None` for creates.
    pub fn original_fields(&self) -> Option<&Fields> {
        self.original.as_ref()
    }

    /// Decodes the committed snapshot as a typed record.
    pub fn record<R: Record>(&self) -> Result<R> {
        from_fields(self.record.clone())
    }

    /// Decodes the previous snapshot as a typed record.
    pub fn original<R: Record>(&self) -> Result<Option<R>> {
        self.original.clone().map(from_fields).transpose()
    }

    /// Returns a field of the committed snapshot.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// Returns a field of the previous snapshot.
    pub fn original_get(&self, field: &str) -> Option<&Value> {
        self.original.as_ref().and_then(|o| o.get(field))
    }

    /// Returns true if the value `project` reads from the typed record
    /// differs between the previous and committed snapshots. Always true for
    /// creates.
    ///
    /// Both snapshots are decoded first, so a field absent from the stored
    /// document compares as its serde default.
    pub fn changed<R, T, F>(&self, project: F) -> Result<bool>
    where
        R: Record,
        T: PartialEq,
        F: Fn(&R) -> T,
    {
        let Some(original) = self.original::<R>()? else {
            return Ok(true);
        };
        let current: R = self.record()?;
        Ok(project(&original) != project(&current))
    }
}

/// A callback run after a record of a given collection is committed.
///
/// Returning an error aborts the remaining hooks for this write and is
/// surfaced to the writer. The primary write stays committed.
#[async_trait]
pub trait RecordHook<S: RecordStore>: Send + Sync {
    /// Returns the name of this hook, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Runs after a record is created.
    async fn after_create(&self, _event: &RecordEvent<'_, S>) -> HookResult {
        Ok(())
    }

    /// Runs after a record is updated.
    async fn after_update(&self, _event: &RecordEvent<'_, S>) -> HookResult {
        Ok(())
    }
}

/// Record store wrapper that dispatches hooks after every committed write.
pub struct HookedStore<S: RecordStore> {
    store: S,
    hooks: HashMap<Collection, Vec<Arc<dyn RecordHook<S>>>>,
}

impl<S: RecordStore + 'static> HookedStore<S> {
    /// Creates a dispatcher with no hooks registered.
    pub fn new(store: S) -> Self {
        Self {
            store,
            hooks: HashMap::new(),
        }
    }

    /// Registers a hook for a collection.
    ///
    /// Hooks run in registration order.
    pub fn register(&mut self, collection: Collection, hook: Arc<dyn RecordHook<S>>) {
        tracing::debug!(%collection, hook = hook.name(), "registering hook");
        self.hooks.entry(collection).or_default().push(hook);
    }

    /// Returns the number of hooks registered for a collection.
    pub fn hook_count(&self, collection: Collection) -> usize {
        self.hooks.get(&collection).map_or(0, Vec::len)
    }

    /// Returns the underlying store. Writes through it bypass hooks.
    pub fn records(&self) -> &S {
        &self.store
    }

    /// Creates a record, then runs the collection's `after_create` hooks.
    #[tracing::instrument(skip_all, fields(collection = %R::COLLECTION, id = %record.id()))]
    pub async fn create<R: Record>(&self, record: &R) -> Result<R> {
        let collection = R::COLLECTION;

        for (target, id) in record.references() {
            if self.store.find_by_id(target, id).await?.is_none() {
                return Err(StoreError::Validation {
                    collection,
                    message: format!("referenced {target} {id} does not exist"),
                });
            }
        }

        let stored = self.store.insert(collection, to_fields(record)?).await?;
        metrics::counter!(
            "records_written_total",
            "collection" => collection.as_str(),
            "operation" => "create"
        )
        .increment(1);

        self.dispatch(HookOperation::Create, collection, stored.clone(), None)
            .await?;
        from_fields(stored)
    }

    /// Updates a record, then runs the collection's `after_update` hooks
    /// with the committed and previous snapshots.
    #[tracing::instrument(skip_all, fields(collection = %R::COLLECTION, id = %record.id()))]
    pub async fn update<R: Record>(&self, record: &R) -> Result<R> {
        let collection = R::COLLECTION;
        if collection.is_append_only() {
            return Err(StoreError::AppendOnly(collection));
        }

        let id = record.id();
        let existing = self
            .store
            .find_by_id(collection, id)
            .await?
            .ok_or(StoreError::NotFound { collection, id })?;

        let fields = to_fields(record)?;
        for field in R::IMMUTABLE_FIELDS {
            if existing.get(*field) != fields.get(*field) {
                return Err(StoreError::Validation {
                    collection,
                    message: format!("field '{field}' cannot be changed"),
                });
            }
        }

        let Replaced { previous, current } = self.store.replace(collection, fields).await?;
        metrics::counter!(
            "records_written_total",
            "collection" => collection.as_str(),
            "operation" => "update"
        )
        .increment(1);

        // Hooks see the snapshot the write actually replaced
        self.dispatch(
            HookOperation::Update,
            collection,
            current.clone(),
            Some(previous),
        )
        .await?;
        from_fields(current)
    }

    /// Loads a typed record, failing with `NotFound` if it is absent.
    pub async fn fetch<R: Record>(&self, id: RecordId) -> Result<R> {
        self.store.fetch(id).await
    }

    /// Loads a typed record if it exists.
    pub async fn fetch_optional<R: Record>(&self, id: RecordId) -> Result<Option<R>> {
        self.store.fetch_optional(id).await
    }

    /// Loads every typed record matching a filter, oldest first.
    pub async fn fetch_all<R: Record>(&self, filter: &RecordFilter) -> Result<Vec<R>> {
        self.store.fetch_all(filter).await
    }

    async fn dispatch(
        &self,
        operation: HookOperation,
        collection: Collection,
        record: Fields,
        original: Option<Fields>,
    ) -> Result<()> {
        let Some(hooks) = self.hooks.get(&collection) else {
            return Ok(());
        };

        let event = RecordEvent {
            store: self,
            operation,
            collection,
            record,
            original,
        };

        for hook in hooks {
            let result = match operation {
                HookOperation::Create => hook.after_create(&event).await,
                HookOperation::Update => hook.after_update(&event).await,
            };
            result.map_err(|source| StoreError::Hook {
                hook: hook.name(),
                operation,
                collection,
                source,
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryRecordStore;
    use serde::{Deserialize, Serialize};
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Parent {
        id: RecordId,
        label: String,
    }

    impl Record for Parent {
        const COLLECTION: Collection = Collection::Order;

        fn id(&self) -> RecordId {
            self.id
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Child {
        id: RecordId,
        parent: RecordId,
        label: String,
    }

    impl Record for Child {
        const COLLECTION: Collection = Collection::OrderItem;
        const IMMUTABLE_FIELDS: &'static [&'static str] = &["parent"];

        fn id(&self) -> RecordId {
            self.id
        }

        fn references(&self) -> Vec<(Collection, RecordId)> {
            vec![(Collection::Order, self.parent)]
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct LogEntry {
        id: RecordId,
    }

    impl Record for LogEntry {
        const COLLECTION: Collection = Collection::Event;

        fn id(&self) -> RecordId {
            self.id
        }
    }

    /// Records every invocation it sees.
    #[derive(Default)]
    struct RecordingHook {
        calls: Mutex<Vec<(HookOperation, Option<Value>, Option<Value>)>>,
    }

    #[async_trait]
    impl<S: RecordStore> RecordHook<S> for RecordingHook {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn after_create(&self, event: &RecordEvent<'_, S>) -> HookResult {
            self.calls
                .lock()
                .await
                .push((event.operation(), event.get("label").cloned(), None));
            Ok(())
        }

        async fn after_update(&self, event: &RecordEvent<'_, S>) -> HookResult {
            self.calls.lock().await.push((
                event.operation(),
                event.get("label").cloned(),
                event.original_get("label").cloned(),
            ));
            Ok(())
        }
    }

    struct FailingHook;

    #[async_trait]
    impl<S: RecordStore> RecordHook<S> for FailingHook {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn after_create(&self, _event: &RecordEvent<'_, S>) -> HookResult {
            Err("boom".into())
        }
    }

    /// Mirrors a child's label onto its parent, re-entering the dispatcher.
    struct MirrorHook;

    #[async_trait]
    impl<S: RecordStore + 'static> RecordHook<S> for MirrorHook {
        fn name(&self) -> &'static str {
            "mirror"
        }

        async fn after_update(&self, event: &RecordEvent<'_, S>) -> HookResult {
            if !event.changed(|child: &Child| child.label.clone())? {
                return Ok(());
            }
            let child: Child = event.record()?;
            let mut parent: Parent = event.store().fetch(child.parent).await?;
            if parent.label == child.label {
                return Ok(());
            }
            parent.label = child.label;
            event.store().update(&parent).await?;
            Ok(())
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Flag {
        id: RecordId,
        #[serde(default)]
        enabled: bool,
    }

    impl Record for Flag {
        const COLLECTION: Collection = Collection::Product;

        fn id(&self) -> RecordId {
            self.id
        }
    }

    /// Collects whether `enabled` changed on each update.
    #[derive(Default)]
    struct EnabledChanges {
        seen: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl<S: RecordStore> RecordHook<S> for EnabledChanges {
        fn name(&self) -> &'static str {
            "enabled_changes"
        }

        async fn after_update(&self, event: &RecordEvent<'_, S>) -> HookResult {
            let changed = event.changed(|flag: &Flag| flag.enabled)?;
            self.seen.lock().await.push(changed);
            Ok(())
        }
    }

    fn parent(label: &str) -> Parent {
        Parent {
            id: RecordId::new(),
            label: label.to_string(),
        }
    }

    fn child(parent: &Parent, label: &str) -> Child {
        Child {
            id: RecordId::new(),
            parent: parent.id,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn create_runs_after_create_hooks() {
        let recording = Arc::new(RecordingHook::default());
        let mut store = HookedStore::new(InMemoryRecordStore::new());
        store.register(Collection::Order, recording.clone());

        store.create(&parent("a")).await.unwrap();

        let calls = recording.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, HookOperation::Create);
        assert_eq!(calls[0].1, Some(Value::from("a")));
    }

    #[tokio::test]
    async fn update_passes_previous_snapshot() {
        let recording = Arc::new(RecordingHook::default());
        let mut store = HookedStore::new(InMemoryRecordStore::new());
        store.register(Collection::Order, recording.clone());

        let mut p = store.create(&parent("a")).await.unwrap();
        p.label = "b".to_string();
        store.update(&p).await.unwrap();

        let calls = recording.calls.lock().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, HookOperation::Update);
        assert_eq!(calls[1].1, Some(Value::from("b")));
        assert_eq!(calls[1].2, Some(Value::from("a")));
    }

    #[tokio::test]
    async fn hooks_only_run_for_their_collection() {
        let recording = Arc::new(RecordingHook::default());
        let mut store = HookedStore::new(InMemoryRecordStore::new());
        store.register(Collection::OrderItem, recording.clone());

        store.create(&parent("a")).await.unwrap();

        assert!(recording.calls.lock().await.is_empty());
        assert_eq!(store.hook_count(Collection::OrderItem), 1);
        assert_eq!(store.hook_count(Collection::Order), 0);
    }

    #[tokio::test]
    async fn hook_failure_surfaces_but_write_stays_committed() {
        let mut store = HookedStore::new(InMemoryRecordStore::new());
        store.register(Collection::Order, Arc::new(FailingHook));

        let p = parent("a");
        let result = store.create(&p).await;

        assert!(matches!(
            result,
            Err(StoreError::Hook {
                hook: "failing",
                operation: HookOperation::Create,
                ..
            })
        ));
        assert!(store.fetch_optional::<Parent>(p.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_rejects_dangling_reference() {
        let store = HookedStore::new(InMemoryRecordStore::new());
        let orphan = child(&parent("never stored"), "x");

        let result = store.create(&orphan).await;

        assert!(matches!(result, Err(StoreError::Validation { .. })));
        assert_eq!(store.records().record_count(Collection::OrderItem).await, 0);
    }

    #[tokio::test]
    async fn update_rejects_immutable_field_change() {
        let store = HookedStore::new(InMemoryRecordStore::new());
        let first = store.create(&parent("a")).await.unwrap();
        let second = store.create(&parent("b")).await.unwrap();
        let mut c = store.create(&child(&first, "x")).await.unwrap();

        c.parent = second.id;
        let result = store.update(&c).await;

        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = HookedStore::new(InMemoryRecordStore::new());
        let result = store.update(&parent("ghost")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn append_only_collections_reject_updates() {
        let store = HookedStore::new(InMemoryRecordStore::new());
        let entry = store
            .create(&LogEntry {
                id: RecordId::new(),
            })
            .await
            .unwrap();

        let result = store.update(&entry).await;

        assert!(matches!(
            result,
            Err(StoreError::AppendOnly(Collection::Event))
        ));
    }

    #[tokio::test]
    async fn writes_from_hooks_re_enter_the_dispatcher() {
        let recording = Arc::new(RecordingHook::default());
        let mut store = HookedStore::new(InMemoryRecordStore::new());
        store.register(Collection::OrderItem, Arc::new(MirrorHook));
        store.register(Collection::Order, recording.clone());

        let p = store.create(&parent("a")).await.unwrap();
        let mut c = store.create(&child(&p, "a")).await.unwrap();

        c.label = "b".to_string();
        store.update(&c).await.unwrap();

        let stored: Parent = store.fetch(p.id).await.unwrap();
        assert_eq!(stored.label, "b");

        // One create and one mirrored update reached the parent hooks
        let calls = recording.calls.lock().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, HookOperation::Update);
    }

    #[tokio::test]
    async fn missing_field_compares_as_its_default() {
        let changes = Arc::new(EnabledChanges::default());
        let mut store = HookedStore::new(InMemoryRecordStore::new());
        store.register(Collection::Product, changes.clone());

        // A document written without the `enabled` field
        let id = RecordId::new();
        let serde_json::Value::Object(fields) = serde_json::json!({ "id": id }) else {
            unreachable!()
        };
        store
            .records()
            .insert(Collection::Product, fields)
            .await
            .unwrap();

        store.update(&Flag { id, enabled: false }).await.unwrap();
        store.update(&Flag { id, enabled: true }).await.unwrap();

        assert_eq!(*changes.seen.lock().await, vec![false, true]);
    }
}
