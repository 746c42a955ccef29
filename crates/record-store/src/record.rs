//! Typed records and their JSON field representation.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Collection, RecordId, Result, StoreError};

/// A record as stored: a JSON object keyed by field name.
pub type Fields = serde_json::Map<String, Value>;

/// Field holding the record id.
pub const ID_FIELD: &str = "id";

/// Field holding the insert timestamp, assigned by the store.
pub const CREATED_FIELD: &str = "created";

/// Field holding the last-write timestamp, assigned by the store.
pub const UPDATED_FIELD: &str = "updated";

/// A typed record belonging to exactly one collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection records of this type live in.
    const COLLECTION: Collection;

    /// Fields that may not change once the record exists.
    const IMMUTABLE_FIELDS: &'static [&'static str] = &[];

    /// Returns the record's unique identifier.
    fn id(&self) -> RecordId;

    /// Foreign references that must resolve when the record is created.
    fn references(&self) -> Vec<(Collection, RecordId)> {
        Vec::new()
    }
}

/// Converts a typed record into its field map.
pub fn to_fields<R: Record>(record: &R) -> Result<Fields> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Validation {
            collection: R::COLLECTION,
            message: format!("record must serialize to an object, got {other}"),
        }),
    }
}

/// Converts a field map back into a typed record.
pub fn from_fields<R: Record>(fields: Fields) -> Result<R> {
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Reads the id field of a field map.
pub fn record_id(collection: Collection, fields: &Fields) -> Result<RecordId> {
    let value = fields
        .get(ID_FIELD)
        .cloned()
        .ok_or_else(|| StoreError::Validation {
            collection,
            message: "missing id field".to_string(),
        })?;
    Ok(serde_json::from_value(value)?)
}
