//! Order and order item records.

use chrono::{DateTime, Utc};
use common::RecordId;
use record_store::{Collection, Record};
use serde::{Deserialize, Serialize};

use crate::{OrderItemStatus, OrderStatus};

/// A customer order. Owns zero or more order items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a new order in the initial stage.
    pub fn new() -> Self {
        Self::with_status(OrderStatus::default())
    }

    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            id: RecordId::new(),
            status,
            created: None,
            updated: None,
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl Record for Order {
    const COLLECTION: Collection = Collection::Order;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// A single line of an order. Always belongs to exactly one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: RecordId,
    /// The owning order. Fixed at creation.
    pub order: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<RecordId>,
    #[serde(default)]
    pub status: OrderItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl OrderItem {
    /// Creates a new item of `order` in the initial stage.
    pub fn new(order: RecordId) -> Self {
        Self {
            id: RecordId::new(),
            order,
            product: None,
            status: OrderItemStatus::default(),
            created: None,
            updated: None,
        }
    }

    pub fn with_product(mut self, product: RecordId) -> Self {
        self.product = Some(product);
        self
    }

    pub fn with_status(mut self, status: OrderItemStatus) -> Self {
        self.status = status;
        self
    }
}

impl Record for OrderItem {
    const COLLECTION: Collection = Collection::OrderItem;
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["order"];

    fn id(&self) -> RecordId {
        self.id
    }

    fn references(&self) -> Vec<(Collection, RecordId)> {
        let mut references = vec![(Collection::Order, self.order)];
        if let Some(product) = self.product {
            references.push((Collection::Product, product));
        }
        references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_store::record::{from_fields, to_fields};

    #[test]
    fn test_new_order_starts_aufgegeben() {
        let order = Order::new();
        assert_eq!(order.status, OrderStatus::Aufgegeben);
        assert!(order.created.is_none());
    }

    #[test]
    fn test_item_references_order_and_product() {
        let order = Order::new();
        let product = RecordId::new();
        let item = OrderItem::new(order.id).with_product(product);

        assert_eq!(
            item.references(),
            vec![
                (Collection::Order, order.id),
                (Collection::Product, product)
            ]
        );
    }

    #[test]
    fn test_item_without_product_only_references_order() {
        let order = Order::new();
        let item = OrderItem::new(order.id);
        assert_eq!(item.references(), vec![(Collection::Order, order.id)]);
    }

    #[test]
    fn test_item_fields_use_relation_names() {
        let order = Order::new();
        let item = OrderItem::new(order.id).with_status(OrderItemStatus::InArbeit);
        let fields = to_fields(&item).unwrap();

        assert_eq!(fields["order"], serde_json::json!(order.id.to_string()));
        assert_eq!(fields["status"], serde_json::json!("InArbeit"));
        assert!(!fields.contains_key("product"));

        let back: OrderItem = from_fields(fields).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_missing_status_defaults_to_initial_stage() {
        let id = RecordId::new();
        let order: Order =
            serde_json::from_value(serde_json::json!({ "id": id.to_string() })).unwrap();
        assert_eq!(order.status, OrderStatus::Aufgegeben);
    }
}
