//! Product availability events.

use async_trait::async_trait;
use domain::{Product, ProductEvent};
use record_store::{HookResult, RecordEvent, RecordHook, RecordStore};

use crate::EventRecorder;

/// Records a product event on creation and whenever `is_available` flips.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductAvailabilityNotifier {
    recorder: EventRecorder,
}

impl ProductAvailabilityNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    async fn notify<S: RecordStore + 'static>(&self, event: &RecordEvent<'_, S>) -> HookResult {
        let product: Product = event.record()?;
        self.recorder
            .record(
                event.store(),
                ProductEvent {
                    product_id: product.id,
                    is_available: product.is_available,
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<S: RecordStore + 'static> RecordHook<S> for ProductAvailabilityNotifier {
    fn name(&self) -> &'static str {
        "product_availability"
    }

    async fn after_create(&self, event: &RecordEvent<'_, S>) -> HookResult {
        self.notify(event).await
    }

    async fn after_update(&self, event: &RecordEvent<'_, S>) -> HookResult {
        if !event.changed(|product: &Product| product.is_available)? {
            tracing::debug!("product availability unchanged");
            return Ok(());
        }
        self.notify(event).await
    }
}
