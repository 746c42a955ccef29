//! Identifier types shared by every layer of the order-fulfillment backend.

mod types;

pub use types::{ParseRecordIdError, RecordId};
