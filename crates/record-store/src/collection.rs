use serde::{Deserialize, Serialize};

/// The record collections known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Order,
    OrderItem,
    Product,
    Payment,
    PaymentOption,
    Event,
}

impl Collection {
    /// Every collection, in schema order.
    pub const ALL: [Collection; 6] = [
        Collection::Order,
        Collection::OrderItem,
        Collection::Product,
        Collection::Payment,
        Collection::PaymentOption,
        Collection::Event,
    ];

    /// Returns the collection name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Order => "order",
            Collection::OrderItem => "order_item",
            Collection::Product => "product",
            Collection::Payment => "payment",
            Collection::PaymentOption => "payment_option",
            Collection::Event => "event",
        }
    }

    /// Returns true if records in this collection can never be updated.
    pub fn is_append_only(&self) -> bool {
        matches!(self, Collection::Event)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_match_serde_form() {
        for collection in Collection::ALL {
            let json = serde_json::to_string(&collection).unwrap();
            assert_eq!(json, format!("\"{}\"", collection.as_str()));
        }
    }

    #[test]
    fn only_event_is_append_only() {
        assert!(Collection::Event.is_append_only());
        assert!(!Collection::Order.is_append_only());
        assert!(!Collection::OrderItem.is_append_only());
        assert!(!Collection::Product.is_append_only());
        assert!(!Collection::Payment.is_append_only());
    }
}
