//! The export document.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::RecordId;
use domain::{EventKind, EventRecord, Order, OrderItem, Payment, PaymentOption, Product};
use record_store::{RecordFilter, RecordStore, RecordStoreExt};
use serde::Serialize;
use serde_json::Value;

use crate::{ExportRange, Result};

/// An event as it appears in the export, with its content decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedEvent {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub content: Value,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductExport {
    #[serde(flatten)]
    pub product: Product,
    pub events: Vec<ExportedEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemExport {
    #[serde(flatten)]
    pub item: OrderItem,
    pub events: Vec<ExportedEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderExport {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItemExport>,
    pub events: Vec<ExportedEvent>,
}

/// The payment option of an exported payment. Expanded to the full record
/// when it exists, otherwise left as the stored id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaymentOptionExport {
    Expanded(PaymentOption),
    Id(RecordId),
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentExport {
    pub id: RecordId,
    pub payment_option: PaymentOptionExport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    pub events: Vec<ExportedEvent>,
}

impl PaymentExport {
    fn new(payment: Payment, options: &HashMap<RecordId, PaymentOption>) -> Self {
        let payment_option = match options.get(&payment.payment_option) {
            Some(option) => PaymentOptionExport::Expanded(option.clone()),
            None => PaymentOptionExport::Id(payment.payment_option),
        };
        Self {
            id: payment.id,
            payment_option,
            order: payment.order,
            created: payment.created,
            updated: payment.updated,
            events: Vec::new(),
        }
    }
}

/// Products, orders and payments created in a range, and the events
/// recorded in that range attached to the record they name.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub filter: ExportRange,
    pub products: Vec<ProductExport>,
    pub orders: Vec<OrderExport>,
    pub payments: Vec<PaymentExport>,
}

impl ExportReport {
    /// Reads the records for `range` and assembles the report.
    ///
    /// Every product is included regardless of `range`. Events of unknown
    /// type, with undecodable content, or about a record outside the
    /// report are left out.
    #[tracing::instrument(skip(store))]
    pub async fn build<S: RecordStore + ?Sized>(store: &S, range: ExportRange) -> Result<Self> {
        let window = RecordFilter::new().created_between(range.start, range.end);

        let products: Vec<Product> = store.fetch_all(&RecordFilter::new()).await?;
        let orders: Vec<Order> = store.fetch_all(&window).await?;
        let items: Vec<OrderItem> = if orders.is_empty() {
            Vec::new()
        } else {
            let order_ids = orders.iter().map(|order| order.id.to_string());
            store
                .fetch_all(&RecordFilter::new().field_in("order", order_ids))
                .await?
        };
        let payments: Vec<Payment> = store.fetch_all(&window).await?;
        let options: Vec<PaymentOption> = if payments.is_empty() {
            Vec::new()
        } else {
            store.fetch_all(&RecordFilter::new()).await?
        };
        let options: HashMap<RecordId, PaymentOption> = options
            .into_iter()
            .map(|option| (option.id, option))
            .collect();
        let events: Vec<EventRecord> = store.fetch_all(&window).await?;

        let mut report = Self {
            filter: range,
            products: products
                .into_iter()
                .map(|product| ProductExport {
                    product,
                    events: Vec::new(),
                })
                .collect(),
            orders: orders
                .into_iter()
                .map(|order| OrderExport {
                    order,
                    order_items: Vec::new(),
                    events: Vec::new(),
                })
                .collect(),
            payments: payments
                .into_iter()
                .map(|payment| PaymentExport::new(payment, &options))
                .collect(),
        };

        let order_index: HashMap<RecordId, usize> = report
            .orders
            .iter()
            .enumerate()
            .map(|(i, o)| (o.order.id, i))
            .collect();
        let product_index: HashMap<RecordId, usize> = report
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.product.id, i))
            .collect();
        let payment_index: HashMap<RecordId, usize> = report
            .payments
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();

        let mut item_index: HashMap<RecordId, (usize, usize)> = HashMap::new();
        for item in items {
            let Some(&order_pos) = order_index.get(&item.order) else {
                continue;
            };
            let order_items = &mut report.orders[order_pos].order_items;
            item_index.insert(item.id, (order_pos, order_items.len()));
            order_items.push(OrderItemExport {
                item,
                events: Vec::new(),
            });
        }

        let mut skipped = 0usize;
        for event in events {
            let Some(kind) = event.kind() else {
                skipped += 1;
                continue;
            };
            let payload = match event.payload() {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(event_id = %event.id, error = %e, "skipping undecodable event");
                    skipped += 1;
                    continue;
                }
            };
            let subject = payload.subject_id();
            let exported = ExportedEvent {
                id: event.id,
                content: serde_json::from_str(&event.content)?,
                event_type: event.event_type,
                created: event.created,
            };

            let target = match kind {
                EventKind::Order => order_index
                    .get(&subject)
                    .map(|&i| &mut report.orders[i].events),
                EventKind::OrderItem => item_index
                    .get(&subject)
                    .map(|&(o, i)| &mut report.orders[o].order_items[i].events),
                EventKind::Product => product_index
                    .get(&subject)
                    .map(|&i| &mut report.products[i].events),
                EventKind::Payment => payment_index
                    .get(&subject)
                    .map(|&i| &mut report.payments[i].events),
            };
            match target {
                Some(events) => events.push(exported),
                None => skipped += 1,
            }
        }

        tracing::info!(
            products = report.products.len(),
            orders = report.orders.len(),
            payments = report.payments.len(),
            skipped_events = skipped,
            "export built"
        );
        Ok(report)
    }

    /// Number of events attached anywhere in the report.
    pub fn event_count(&self) -> usize {
        let product_events: usize = self.products.iter().map(|p| p.events.len()).sum();
        let order_events: usize = self
            .orders
            .iter()
            .map(|o| o.events.len() + o.order_items.iter().map(|i| i.events.len()).sum::<usize>())
            .sum();
        let payment_events: usize = self.payments.iter().map(|p| p.events.len()).sum();
        product_events + order_events + payment_events
    }

    /// Serializes the report as indented JSON.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
