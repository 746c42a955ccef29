//! Record store collaborator for the order-fulfillment backend.
//!
//! Provides typed record collections over a JSON field representation,
//! an in-memory and a PostgreSQL implementation, and the hook dispatcher
//! that runs callbacks after a record write has been committed.

pub mod collection;
pub mod error;
pub mod filter;
pub mod hooks;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use collection::Collection;
pub use common::RecordId;
pub use error::{Result, StoreError};
pub use filter::{FieldCondition, RecordFilter};
pub use hooks::{HookError, HookOperation, HookResult, HookedStore, RecordEvent, RecordHook};
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use record::{Fields, Record};
pub use store::{RecordStore, RecordStoreExt, Replaced};
