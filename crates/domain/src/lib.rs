//! Domain layer for the order-fulfillment backend.
//!
//! This crate provides:
//! - the ordered stage vocabularies for orders and order items
//! - the `Order`, `OrderItem`, `Product`, `Payment` and `PaymentOption` records
//! - the event model: kind tags, payloads and the persisted event record

pub mod error;
pub mod event;
pub mod order;
pub mod payment;
pub mod product;
pub mod status;

pub use error::{DomainError, StatusError};
pub use event::{
    EventKind, EventPayload, EventRecord, OrderEvent, OrderItemEvent, PaymentEvent, ProductEvent,
};
pub use order::{Order, OrderItem};
pub use payment::{Payment, PaymentOption};
pub use product::Product;
pub use status::{OrderItemStatus, OrderStatus};
