//! Product records.

use chrono::{DateTime, Utc};
use common::RecordId;
use record_store::{Collection, Record};
use serde::{Deserialize, Serialize};

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(name: impl Into<String>, is_available: bool) -> Self {
        Self {
            id: RecordId::new(),
            name: name.into(),
            is_available,
            created: None,
            updated: None,
        }
    }
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Product;

    fn id(&self) -> RecordId {
        self.id
    }
}
