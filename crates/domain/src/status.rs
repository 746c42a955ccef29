//! Stage vocabularies for orders and order items.
//!
//! Both vocabularies enumerate the same ordered stages:
//! ```text
//! Aufgegeben < InArbeit < Abholbereit < Geliefert < Bezahlt
//! ```
//! and convert into each other by name.

use serde::{Deserialize, Serialize};

use crate::StatusError;

macro_rules! stage_vocabulary {
    ($name:ident, $vocabulary:literal) => {
        impl $name {
            /// Every stage, in lifecycle order.
            pub const ALL: [$name; 5] = [
                $name::Aufgegeben,
                $name::InArbeit,
                $name::Abholbereit,
                $name::Geliefert,
                $name::Bezahlt,
            ];

            /// Returns the literal stage name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::Aufgegeben => "Aufgegeben",
                    $name::InArbeit => "InArbeit",
                    $name::Abholbereit => "Abholbereit",
                    $name::Geliefert => "Geliefert",
                    $name::Bezahlt => "Bezahlt",
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .into_iter()
                    .find(|stage| stage.as_str() == s)
                    .ok_or_else(|| StatusError::UnknownStage {
                        vocabulary: $vocabulary,
                        value: s.to_string(),
                    })
            }
        }
    };
}

/// The lifecycle stage of an order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum OrderStatus {
    /// Order has been placed.
    #[default]
    Aufgegeben,

    /// The kitchen is working on the order.
    InArbeit,

    /// Ready to be picked up.
    Abholbereit,

    /// Handed over to the customer.
    Geliefert,

    /// Paid (terminal).
    Bezahlt,
}

/// The lifecycle stage of a single order item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum OrderItemStatus {
    #[default]
    Aufgegeben,
    InArbeit,
    Abholbereit,
    Geliefert,
    Bezahlt,
}

stage_vocabulary!(OrderStatus, "order");
stage_vocabulary!(OrderItemStatus, "order item");

impl From<OrderItemStatus> for OrderStatus {
    fn from(status: OrderItemStatus) -> Self {
        match status {
            OrderItemStatus::Aufgegeben => OrderStatus::Aufgegeben,
            OrderItemStatus::InArbeit => OrderStatus::InArbeit,
            OrderItemStatus::Abholbereit => OrderStatus::Abholbereit,
            OrderItemStatus::Geliefert => OrderStatus::Geliefert,
            OrderItemStatus::Bezahlt => OrderStatus::Bezahlt,
        }
    }
}

impl From<OrderStatus> for OrderItemStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Aufgegeben => OrderItemStatus::Aufgegeben,
            OrderStatus::InArbeit => OrderItemStatus::InArbeit,
            OrderStatus::Abholbereit => OrderItemStatus::Abholbereit,
            OrderStatus::Geliefert => OrderItemStatus::Geliefert,
            OrderStatus::Bezahlt => OrderItemStatus::Bezahlt,
        }
    }
}
