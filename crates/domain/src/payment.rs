//! Payment and payment option records.
//!
//! Payments are only stored and exported here. Settling an order is
//! expressed through the `Bezahlt` stage, not through these records.

use chrono::{DateTime, Utc};
use common::RecordId;
use record_store::{Collection, Record};
use serde::{Deserialize, Serialize};

/// A way to pay, such as `Bar` or `Karte`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOption {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl PaymentOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            name: name.into(),
            created: None,
            updated: None,
        }
    }
}

impl Record for PaymentOption {
    const COLLECTION: Collection = Collection::PaymentOption;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// A payment made with one payment option, optionally for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: RecordId,
    pub payment_option: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn new(payment_option: RecordId) -> Self {
        Self {
            id: RecordId::new(),
            payment_option,
            order: None,
            created: None,
            updated: None,
        }
    }

    pub fn for_order(mut self, order: RecordId) -> Self {
        self.order = Some(order);
        self
    }
}

impl Record for Payment {
    const COLLECTION: Collection = Collection::Payment;

    fn id(&self) -> RecordId {
        self.id
    }

    fn references(&self) -> Vec<(Collection, RecordId)> {
        let mut references = vec![(Collection::PaymentOption, self.payment_option)];
        if let Some(order) = self.order {
            references.push((Collection::Order, order));
        }
        references
    }
}
