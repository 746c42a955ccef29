//! The event model.
//!
//! Every recorded event is a row in the append-only `event` collection:
//! a kind tag (`type`) plus a JSON document (`content`) whose shape is
//! fixed per kind:
//!
//! | type         | content                              |
//! |--------------|--------------------------------------|
//! | `order`      | `{"order_id": .., "status": ..}`      |
//! | `order_item` | `{"order_item_id": .., "status": ..}` |
//! | `product`    | `{"product_id": .., "is_available": ..}` |
//! | `payment`    | `{"payment_id": .., "payment_option": ..}` |

use chrono::{DateTime, Utc};
use common::RecordId;
use record_store::{Collection, Record};
use serde::{Deserialize, Serialize};

use crate::{DomainError, OrderItemStatus, OrderStatus};

/// The kind tag of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Order,
    OrderItem,
    Product,
    Payment,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Order,
        EventKind::OrderItem,
        EventKind::Product,
        EventKind::Payment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Order => "order",
            EventKind::OrderItem => "order_item",
            EventKind::Product => "product",
            EventKind::Payment => "payment",
        }
    }

    /// Reads a kind tag. Returns `None` for tags this model does not know.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// The content field holding the id of the record the event is about.
    pub fn subject_field(&self) -> &'static str {
        match self {
            EventKind::Order => "order_id",
            EventKind::OrderItem => "order_item_id",
            EventKind::Product => "product_id",
            EventKind::Payment => "payment_id",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order reached a new stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: RecordId,
    pub status: OrderStatus,
}

/// An order item reached a new stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemEvent {
    pub order_item_id: RecordId,
    pub status: OrderItemStatus,
}

/// A product's availability changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEvent {
    pub product_id: RecordId,
    pub is_available: bool,
}

/// A payment was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub payment_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_option: Option<RecordId>,
}

/// An event payload. Each variant knows its own kind tag.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Order(OrderEvent),
    OrderItem(OrderItemEvent),
    Product(ProductEvent),
    Payment(PaymentEvent),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Order(_) => EventKind::Order,
            EventPayload::OrderItem(_) => EventKind::OrderItem,
            EventPayload::Product(_) => EventKind::Product,
            EventPayload::Payment(_) => EventKind::Payment,
        }
    }

    /// The id of the record this event is about.
    pub fn subject_id(&self) -> RecordId {
        match self {
            EventPayload::Order(e) => e.order_id,
            EventPayload::OrderItem(e) => e.order_item_id,
            EventPayload::Product(e) => e.product_id,
            EventPayload::Payment(e) => e.payment_id,
        }
    }

    /// Serializes the payload into the `content` string.
    pub fn content(&self) -> Result<String, serde_json::Error> {
        match self {
            EventPayload::Order(e) => serde_json::to_string(e),
            EventPayload::OrderItem(e) => serde_json::to_string(e),
            EventPayload::Product(e) => serde_json::to_string(e),
            EventPayload::Payment(e) => serde_json::to_string(e),
        }
    }

    /// Decodes a `content` string written for `kind`.
    pub fn decode(kind: EventKind, content: &str) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EventKind::Order => EventPayload::Order(serde_json::from_str(content)?),
            EventKind::OrderItem => EventPayload::OrderItem(serde_json::from_str(content)?),
            EventKind::Product => EventPayload::Product(serde_json::from_str(content)?),
            EventKind::Payment => EventPayload::Payment(serde_json::from_str(content)?),
        })
    }
}

impl From<OrderEvent> for EventPayload {
    fn from(event: OrderEvent) -> Self {
        EventPayload::Order(event)
    }
}

impl From<OrderItemEvent> for EventPayload {
    fn from(event: OrderItemEvent) -> Self {
        EventPayload::OrderItem(event)
    }
}

impl From<ProductEvent> for EventPayload {
    fn from(event: ProductEvent) -> Self {
        EventPayload::Product(event)
    }
}

impl From<PaymentEvent> for EventPayload {
    fn from(event: PaymentEvent) -> Self {
        EventPayload::Payment(event)
    }
}

/// A persisted event, as stored in the `event` collection.
///
/// The tag is kept as a plain string so that rows written by other
/// producers with tags unknown to [`EventKind`] still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl EventRecord {
    /// Builds a new, not yet persisted event row for a payload.
    pub fn from_payload(payload: &EventPayload) -> Result<Self, DomainError> {
        Ok(Self {
            id: RecordId::new(),
            event_type: payload.kind().as_str().to_string(),
            content: payload.content()?,
            created: None,
        })
    }

    /// The kind tag, if it is one this model knows.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.event_type)
    }

    /// Decodes the content. `Ok(None)` for unknown kinds.
    pub fn payload(&self) -> Result<Option<EventPayload>, DomainError> {
        Ok(self
            .kind()
            .map(|kind| EventPayload::decode(kind, &self.content))
            .transpose()?)
    }
}

impl Record for EventRecord {
    const COLLECTION: Collection = Collection::Event;

    fn id(&self) -> RecordId {
        self.id
    }
}
