//! Payment events.

use async_trait::async_trait;
use domain::{Payment, PaymentEvent};
use record_store::{HookResult, RecordEvent, RecordHook, RecordStore};

use crate::EventRecorder;

/// Records a payment event when a payment is created.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentNotifier {
    recorder: EventRecorder,
}

impl PaymentNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<S: RecordStore + 'static> RecordHook<S> for PaymentNotifier {
    fn name(&self) -> &'static str {
        "payment"
    }

    async fn after_create(&self, event: &RecordEvent<'_, S>) -> HookResult {
        let payment: Payment = event.record()?;
        self.recorder
            .record(
                event.store(),
                PaymentEvent {
                    payment_id: payment.id,
                    payment_option: Some(payment.payment_option),
                },
            )
            .await?;
        Ok(())
    }
}
