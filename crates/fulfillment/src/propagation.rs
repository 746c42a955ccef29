//! Pure propagation rules between an order and its items.
//!
//! The coordinator consults these before every write. A rule that would
//! not change anything yields nothing, which bounds the re-entrant
//! order/item hook chain to one extra round trip.

use domain::{OrderItem, OrderItemStatus, OrderStatus};

use crate::PropagationPolicy;

/// Returns true if there is at least one item and every item has `status`.
pub fn all_items_have(items: &[OrderItem], status: OrderItemStatus) -> bool {
    !items.is_empty() && items.iter().all(|item| item.status == status)
}

/// Returns the status the items share, if they share one.
pub fn shared_status(items: &[OrderItem]) -> Option<OrderItemStatus> {
    let first = items.first()?.status;
    all_items_have(items, first).then_some(first)
}

/// Decides whether an item change moves the order.
///
/// `items` are all items of the order, including the changed one. Yields
/// the new order status only when the stage propagates, every item has
/// reached `changed`, and the order is not already there.
pub fn order_target(
    items: &[OrderItem],
    changed: OrderItemStatus,
    order_status: OrderStatus,
    policy: &PropagationPolicy,
) -> Option<OrderStatus> {
    if !policy.propagates(changed) || !all_items_have(items, changed) {
        return None;
    }
    let target = OrderStatus::from(changed);
    (target != order_status).then_some(target)
}

/// Returns the items whose status differs from `target`.
pub fn items_to_update(items: &[OrderItem], target: OrderItemStatus) -> Vec<&OrderItem> {
    items.iter().filter(|item| item.status != target).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::RecordId;

    fn items(order: RecordId, statuses: &[OrderItemStatus]) -> Vec<OrderItem> {
        statuses
            .iter()
            .map(|status| OrderItem::new(order).with_status(*status))
            .collect()
    }

    #[test]
    fn test_all_items_have() {
        let order = RecordId::new();
        let same = items(order, &[OrderItemStatus::InArbeit, OrderItemStatus::InArbeit]);
        let mixed = items(order, &[OrderItemStatus::InArbeit, OrderItemStatus::Aufgegeben]);

        assert!(all_items_have(&same, OrderItemStatus::InArbeit));
        assert!(!all_items_have(&same, OrderItemStatus::Bezahlt));
        assert!(!all_items_have(&mixed, OrderItemStatus::InArbeit));
        assert!(!all_items_have(&[], OrderItemStatus::InArbeit));
    }

    #[test]
    fn test_shared_status() {
        let order = RecordId::new();
        let same = items(order, &[OrderItemStatus::Geliefert; 3]);
        let mixed = items(order, &[OrderItemStatus::Geliefert, OrderItemStatus::Bezahlt]);

        assert_eq!(shared_status(&same), Some(OrderItemStatus::Geliefert));
        assert_eq!(shared_status(&mixed), None);
        assert_eq!(shared_status(&[]), None);
    }

    #[test]
    fn test_order_target_on_convergence() {
        let order = RecordId::new();
        let converged = items(order, &[OrderItemStatus::InArbeit; 2]);

        assert_eq!(
            order_target(
                &converged,
                OrderItemStatus::InArbeit,
                OrderStatus::Aufgegeben,
                &PropagationPolicy::all()
            ),
            Some(OrderStatus::InArbeit)
        );
    }

    #[test]
    fn test_order_target_none_when_mixed() {
        let order = RecordId::new();
        let mixed = items(order, &[OrderItemStatus::InArbeit, OrderItemStatus::Aufgegeben]);

        assert_eq!(
            order_target(
                &mixed,
                OrderItemStatus::InArbeit,
                OrderStatus::Aufgegeben,
                &PropagationPolicy::all()
            ),
            None
        );
    }

    #[test]
    fn test_order_target_none_when_order_already_there() {
        let order = RecordId::new();
        let converged = items(order, &[OrderItemStatus::Abholbereit; 2]);

        assert_eq!(
            order_target(
                &converged,
                OrderItemStatus::Abholbereit,
                OrderStatus::Abholbereit,
                &PropagationPolicy::all()
            ),
            None
        );
    }

    #[test]
    fn test_order_target_respects_policy() {
        let order = RecordId::new();
        let converged = items(order, &[OrderItemStatus::Geliefert; 2]);
        let policy = PropagationPolicy::only([OrderStatus::InArbeit]);

        assert_eq!(
            order_target(
                &converged,
                OrderItemStatus::Geliefert,
                OrderStatus::InArbeit,
                &policy
            ),
            None
        );
    }

    #[test]
    fn test_items_to_update_skips_items_at_target() {
        let order = RecordId::new();
        let all = items(
            order,
            &[
                OrderItemStatus::Aufgegeben,
                OrderItemStatus::Bezahlt,
                OrderItemStatus::InArbeit,
            ],
        );

        let pending = items_to_update(&all, OrderItemStatus::Bezahlt);
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|item| item.status != OrderItemStatus::Bezahlt));
        assert!(items_to_update(&all[1..2], OrderItemStatus::Bezahlt).is_empty());
    }
}
