//! Status propagation between orders and their items.
//!
//! Both directions run as after-commit hooks and write through the same
//! dispatcher, so every propagated write re-enters the other direction.
//! Each write is preceded by an equality check, which ends the chain
//! after at most one extra round trip:
//!
//! ```text
//! item update ──▶ all items share S? ──▶ order := S ──▶ items already S: no writes
//! order update ──▶ item := S (each) ──▶ last item converges ──▶ order already S: no write
//! ```

use async_trait::async_trait;
use common::RecordId;
use domain::{Order, OrderEvent, OrderItem, OrderItemEvent, OrderItemStatus};
use record_store::{
    Collection, HookResult, HookedStore, RecordEvent, RecordFilter, RecordHook, RecordStore,
};

use crate::error::{FulfillmentError, Result};
use crate::propagation::{items_to_update, order_target, shared_status};
use crate::{DirectEditPolicy, EventRecorder, Settings};

/// Outcome of pushing an order's status down to its items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Items written with the new status.
    pub updated: usize,

    /// Items that already had the new status.
    pub skipped: usize,

    /// Items whose write or hooks failed. An item whose write committed
    /// before a hook failed already holds the new status.
    pub failed: Vec<RecordId>,
}

/// Keeps order and order item statuses in step and records their events.
///
/// Register it for both the `order` and the `order_item` collection.
#[derive(Debug, Clone, Default)]
pub struct StatusCoordinator {
    settings: Settings,
    recorder: EventRecorder,
}

impl StatusCoordinator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            recorder: EventRecorder::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Loads every item of an order, oldest first.
    pub async fn items_of<S: RecordStore + 'static>(
        store: &HookedStore<S>,
        order_id: RecordId,
    ) -> Result<Vec<OrderItem>> {
        let filter = RecordFilter::new().field_eq("order", order_id.to_string());
        Ok(store.fetch_all(&filter).await?)
    }

    /// Sets every item of `order_id` that is not yet at `target` to `target`.
    ///
    /// Items are written one at a time. A failed write is logged and
    /// counted; the remaining items are still processed.
    #[tracing::instrument(skip_all, fields(%order_id, %target))]
    pub async fn fan_out<S: RecordStore + 'static>(
        &self,
        store: &HookedStore<S>,
        order_id: RecordId,
        target: OrderItemStatus,
    ) -> Result<FanOutReport> {
        let items = Self::items_of(store, order_id).await?;
        let pending = items_to_update(&items, target);

        let mut report = FanOutReport {
            skipped: items.len() - pending.len(),
            ..FanOutReport::default()
        };

        for item in pending {
            let mut updated = item.clone();
            updated.status = target;

            match store.update(&updated).await {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    tracing::error!(
                        order_item_id = %item.id,
                        error = %e,
                        "failed to propagate order status to item"
                    );
                    metrics::counter!("fan_out_failures_total").increment(1);
                    report.failed.push(item.id);
                }
            }
        }

        if report.updated > 0 {
            metrics::counter!("status_propagations_total", "direction" => "order_to_items")
                .increment(1);
        }
        tracing::info!(
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed.len(),
            "order status pushed to items"
        );

        Ok(report)
    }

    async fn order_created<S: RecordStore + 'static>(
        &self,
        event: &RecordEvent<'_, S>,
    ) -> Result<()> {
        let order: Order = event.record()?;
        self.recorder
            .record(
                event.store(),
                OrderEvent {
                    order_id: order.id,
                    status: order.status,
                },
            )
            .await?;
        Ok(())
    }

    async fn order_updated<S: RecordStore + 'static>(
        &self,
        event: &RecordEvent<'_, S>,
    ) -> Result<()> {
        let order: Order = event.record()?;
        if !event.changed(|order: &Order| order.status)? {
            tracing::debug!(order_id = %order.id, "order status unchanged");
            return Ok(());
        }

        let store = event.store();
        self.recorder
            .record(
                store,
                OrderEvent {
                    order_id: order.id,
                    status: order.status,
                },
            )
            .await?;

        if !self.settings.propagation.propagates(order.status) {
            tracing::debug!(order_id = %order.id, status = %order.status, "stage does not propagate");
            return Ok(());
        }

        if self.settings.direct_edit == DirectEditPolicy::RequireConvergence {
            let items = Self::items_of(store, order.id).await?;
            if !items.is_empty() && shared_status(&items).is_none() {
                tracing::info!(
                    order_id = %order.id,
                    status = %order.status,
                    "items disagree, order status not pushed down"
                );
                return Ok(());
            }
        }

        self.fan_out(store, order.id, order.status.into()).await?;
        Ok(())
    }

    async fn item_created<S: RecordStore + 'static>(
        &self,
        event: &RecordEvent<'_, S>,
    ) -> Result<()> {
        let item: OrderItem = event.record()?;
        self.recorder
            .record(
                event.store(),
                OrderItemEvent {
                    order_item_id: item.id,
                    status: item.status,
                },
            )
            .await?;
        Ok(())
    }

    async fn item_updated<S: RecordStore + 'static>(
        &self,
        event: &RecordEvent<'_, S>,
    ) -> Result<()> {
        let item: OrderItem = event.record()?;
        if !event.changed(|item: &OrderItem| item.status)? {
            tracing::debug!(order_item_id = %item.id, "order item status unchanged");
            return Ok(());
        }

        let store = event.store();
        self.recorder
            .record(
                store,
                OrderItemEvent {
                    order_item_id: item.id,
                    status: item.status,
                },
            )
            .await?;

        if !self.settings.propagation.propagates(item.status) {
            tracing::debug!(order_item_id = %item.id, status = %item.status, "stage does not propagate");
            return Ok(());
        }

        let siblings = Self::items_of(store, item.order).await?;
        if shared_status(&siblings) != Some(item.status) {
            tracing::debug!(order_id = %item.order, "items not converged");
            return Ok(());
        }

        let mut order: Order = store
            .fetch_optional(item.order)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(item.order))?;

        let Some(target) = order_target(
            &siblings,
            item.status,
            order.status,
            &self.settings.propagation,
        ) else {
            tracing::debug!(order_id = %order.id, status = %order.status, "order already converged");
            return Ok(());
        };

        tracing::info!(
            order_id = %order.id,
            from = %order.status,
            to = %target,
            "all items converged, updating order"
        );
        order.status = target;
        store.update(&order).await?;
        metrics::counter!("status_propagations_total", "direction" => "item_to_order")
            .increment(1);

        Ok(())
    }
}

#[async_trait]
impl<S: RecordStore + 'static> RecordHook<S> for StatusCoordinator {
    fn name(&self) -> &'static str {
        "status_coordinator"
    }

    #[tracing::instrument(skip_all, fields(collection = %event.collection()))]
    async fn after_create(&self, event: &RecordEvent<'_, S>) -> HookResult {
        match event.collection() {
            Collection::Order => self.order_created(event).await?,
            Collection::OrderItem => self.item_created(event).await?,
            other => tracing::warn!(collection = %other, "status coordinator registered for unexpected collection"),
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(collection = %event.collection()))]
    async fn after_update(&self, event: &RecordEvent<'_, S>) -> HookResult {
        match event.collection() {
            Collection::Order => self.order_updated(event).await?,
            Collection::OrderItem => self.item_updated(event).await?,
            other => tracing::warn!(collection = %other, "status coordinator registered for unexpected collection"),
        }
        Ok(())
    }
}
