//! Event recording and status propagation for the order-fulfillment backend.
//!
//! This crate provides the after-commit hooks that keep orders and their
//! items in step and append an event for every observed change:
//! - [`StatusCoordinator`] for the `order` and `order_item` collections
//! - [`ProductAvailabilityNotifier`] for the `product` collection
//! - [`PaymentNotifier`] for the `payment` collection
//!
//! Use [`register_hooks`] to wire them into a [`HookedStore`].

pub mod availability;
pub mod coordinator;
pub mod error;
pub mod payment;
pub mod policy;
pub mod propagation;
pub mod recorder;

use std::sync::Arc;

use record_store::{Collection, HookedStore, RecordStore};

pub use availability::ProductAvailabilityNotifier;
pub use coordinator::{FanOutReport, StatusCoordinator};
pub use error::{FulfillmentError, Result};
pub use payment::PaymentNotifier;
pub use policy::{DirectEditPolicy, ParsePolicyError, PropagationPolicy, Settings};
pub use recorder::EventRecorder;

/// Registers the status, availability and payment hooks on a dispatcher.
pub fn register_hooks<S: RecordStore + 'static>(store: &mut HookedStore<S>, settings: Settings) {
    tracing::info!(
        propagate = %settings.propagation,
        direct_edit = %settings.direct_edit,
        "registering fulfillment hooks"
    );

    let coordinator = Arc::new(StatusCoordinator::new(settings));
    store.register(Collection::Order, coordinator.clone());
    store.register(Collection::OrderItem, coordinator);
    store.register(
        Collection::Product,
        Arc::new(ProductAvailabilityNotifier::new()),
    );
    store.register(Collection::Payment, Arc::new(PaymentNotifier::new()));
}
