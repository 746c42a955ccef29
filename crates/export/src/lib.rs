//! Read-only reporting over the records and events the hooks write.
//!
//! - [`ExportRange`] validates the requested `[start, end]` window
//! - [`ExportReport`] gathers products, orders with their items, and
//!   payments with their option, then attaches each event to the record
//!   it is about

pub mod error;
pub mod range;
pub mod report;

pub use error::{ExportError, Result};
pub use range::ExportRange;
pub use report::{
    ExportReport, ExportedEvent, OrderExport, OrderItemExport, PaymentExport, PaymentOptionExport,
    ProductExport,
};
