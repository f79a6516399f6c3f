use crate::actor_framework::ChangeEvent;
use crate::domain::{Notification, NotificationKind, Order};

use super::notifications::NotificationCenter;

/// Projection of the orders change feed onto one customer's visible list.
///
/// Events are applied in arrival order; there is no reordering. An event that
/// carries an older or equal `version` than the visible copy is dropped, which
/// covers changes already reflected in the initial load. Events for orders that
/// belong to someone else are ignored.
#[derive(Debug, Clone)]
pub struct CustomerOrderFeed {
    user_id: String,
    orders: Vec<Order>,
    notifications: NotificationCenter,
}

impl CustomerOrderFeed {
    pub fn new(user_id: impl Into<String>, initial: Vec<Order>) -> Self {
        Self {
            user_id: user_id.into(),
            orders: initial,
            notifications: NotificationCenter::default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// Applies one change. Returns the notification it raised, if any.
    ///
    /// Stale updates and inserts of an order already visible change nothing.
    /// A status-changed notification fires only when a newer copy carries a
    /// status different from the visible one.
    pub fn apply(&mut self, event: &ChangeEvent<Order>) -> Option<Notification> {
        match event {
            ChangeEvent::Inserted(order) if order.belongs_to(&self.user_id) => {
                if self.position(&order.order_number).is_some() {
                    return None;
                }
                self.orders.push(order.clone());
                Some(self.notifications.push(
                    NotificationKind::OrderCreated,
                    &order.order_number,
                    format!("Your order {} has been placed.", order.order_number),
                ))
            }
            ChangeEvent::Updated { before, after } => {
                if !after.belongs_to(&self.user_id) {
                    if before.belongs_to(&self.user_id) {
                        self.remove(&after.order_number);
                    }
                    return None;
                }
                let visible_status = match self.position(&after.order_number) {
                    Some(existing) if self.orders[existing].version >= after.version => return None,
                    Some(existing) => {
                        let status = self.orders[existing].status;
                        self.orders[existing] = after.clone();
                        status
                    }
                    None => {
                        self.orders.push(after.clone());
                        before.status
                    }
                };
                (visible_status != after.status).then(|| {
                    self.notifications.push(
                        NotificationKind::StatusChanged,
                        &after.order_number,
                        format!("Order {} is now {}.", after.order_number, after.status.label()),
                    )
                })
            }
            ChangeEvent::Deleted(order) => {
                self.remove(&order.order_number);
                None
            }
            ChangeEvent::Inserted(_) => None,
        }
    }

    fn position(&self, order_number: &str) -> Option<usize> {
        self.orders.iter().position(|o| o.order_number == order_number)
    }

    fn remove(&mut self, order_number: &str) {
        self.orders.retain(|o| o.order_number != order_number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurrencyCode, OrderStatus, PaymentMethod};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn order(number: &str, user: &str, status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            order_number: number.into(),
            user_id: Some(user.into()),
            customer_name: "Mariam".into(),
            customer_email: None,
            customer_phone: "+971501234567".into(),
            customer_address: None,
            customer_city: None,
            items: Vec::new(),
            currency: CurrencyCode::AED,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            coupon_id: None,
            payment_method: PaymentMethod::HomeDelivery,
            status,
            notes: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    fn changed(order: &Order, status: OrderStatus) -> Order {
        let mut next = order.clone();
        next.status = status;
        next.version += 1;
        next
    }

    #[test]
    fn test_insert_appends_and_notifies() {
        let mut feed = CustomerOrderFeed::new("u1", vec![order("ORD-1", "u1", OrderStatus::Pending)]);
        let note = feed
            .apply(&ChangeEvent::Inserted(order("ORD-2", "u1", OrderStatus::Pending)))
            .unwrap();
        assert_eq!(note.kind, NotificationKind::OrderCreated);
        assert_eq!(note.order_number, "ORD-2");
        let numbers: Vec<_> = feed.orders().iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, ["ORD-1", "ORD-2"]);
    }

    #[test]
    fn test_other_customers_are_ignored() {
        let mut feed = CustomerOrderFeed::new("u1", Vec::new());
        assert!(feed
            .apply(&ChangeEvent::Inserted(order("ORD-9", "u2", OrderStatus::Pending)))
            .is_none());
        assert!(feed.orders().is_empty());
    }

    #[test]
    fn test_status_change_notifies_once() {
        let pending = order("ORD-1", "u1", OrderStatus::Pending);
        let shipped = changed(&pending, OrderStatus::Shipped);
        let mut feed = CustomerOrderFeed::new("u1", vec![pending.clone()]);

        let note = feed
            .apply(&ChangeEvent::Updated {
                before: pending.clone(),
                after: shipped.clone(),
            })
            .unwrap();
        assert_eq!(note.kind, NotificationKind::StatusChanged);
        assert_eq!(note.message, "Order ORD-1 is now Shipped.");
        assert_eq!(feed.orders()[0].status, OrderStatus::Shipped);

        // Same update replayed: the visible status already matches.
        assert!(feed
            .apply(&ChangeEvent::Updated {
                before: pending,
                after: shipped
            })
            .is_none());
        assert_eq!(feed.notifications().all().len(), 1);
    }

    #[test]
    fn test_note_update_is_silent() {
        let before = order("ORD-1", "u1", OrderStatus::Confirmed);
        let mut after = changed(&before, OrderStatus::Confirmed);
        after.notes = Some("gift wrap".into());
        let mut feed = CustomerOrderFeed::new("u1", vec![before.clone()]);

        assert!(feed.apply(&ChangeEvent::Updated { before, after }).is_none());
        assert_eq!(feed.orders()[0].notes.as_deref(), Some("gift wrap"));
    }

    #[test]
    fn test_updates_older_than_visible_copy_are_dropped() {
        let pending = order("ORD-1", "u1", OrderStatus::Pending);
        let confirmed = changed(&pending, OrderStatus::Confirmed);
        let processing = changed(&confirmed, OrderStatus::Processing);
        let mut feed = CustomerOrderFeed::new("u1", vec![processing.clone()]);

        assert!(feed
            .apply(&ChangeEvent::Updated {
                before: pending,
                after: confirmed.clone()
            })
            .is_none());
        assert!(feed
            .apply(&ChangeEvent::Updated {
                before: confirmed,
                after: processing
            })
            .is_none());
        assert_eq!(feed.orders()[0].status, OrderStatus::Processing);
        assert!(feed.notifications().all().is_empty());
    }

    #[test]
    fn test_insert_of_visible_order_keeps_newer_copy() {
        let inserted = order("ORD-1", "u1", OrderStatus::Pending);
        let confirmed = changed(&inserted, OrderStatus::Confirmed);
        let mut feed = CustomerOrderFeed::new("u1", vec![confirmed]);

        assert!(feed.apply(&ChangeEvent::Inserted(inserted)).is_none());
        assert_eq!(feed.orders().len(), 1);
        assert_eq!(feed.orders()[0].status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_delete_removes_order() {
        let existing = order("ORD-1", "u1", OrderStatus::Pending);
        let mut feed = CustomerOrderFeed::new("u1", vec![existing.clone()]);
        assert!(feed.apply(&ChangeEvent::Deleted(existing)).is_none());
        assert!(feed.orders().is_empty());
    }
}
