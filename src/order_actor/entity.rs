use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate};
use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn id(&self) -> &String {
        &self.order_number
    }

    /// Creates an Order from a checkout snapshot.
    ///
    /// The initial status follows the payment method (`awaiting_payment` for
    /// deferred channels, `pending` otherwise).
    ///
    /// # Errors
    /// Rejects snapshots without items or whose financial summary does not reconcile.
    fn from_create_params(order_number: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::ValidationError(format!("{order_number}: no line items")));
        }
        let b = params.breakdown;
        let order = Self {
            order_number,
            user_id: params.customer.user_id,
            customer_name: params.customer.name,
            customer_email: params.customer.email,
            customer_phone: params.customer.phone,
            customer_address: params.customer.address,
            customer_city: params.customer.city,
            items: params.items,
            currency: params.currency,
            subtotal: b.subtotal,
            discount: b.discount,
            shipping: b.shipping,
            tax: b.tax,
            total: b.total,
            coupon_id: params.coupon_id,
            payment_method: params.payment_method,
            status: params.payment_method.initial_status(),
            notes: params.notes,
            messages: Vec::new(),
            created_at: params.created_at,
            updated_at: params.created_at,
            version: 0,
        };
        if !order.reconciles() {
            return Err(OrderError::ValidationError(format!(
                "{}: total {} does not reconcile",
                order.order_number, order.total
            )));
        }
        Ok(order)
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Err(OrderError::Immutable(self.order_number.clone()))
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        let result = self.apply(action)?;
        self.version += 1;
        self.updated_at = Utc::now();
        Ok(result)
    }
}

impl Order {
    fn apply(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Transition(to) => {
                let from = self.status;
                if !from.can_transition_to(to) {
                    return Err(OrderError::InvalidTransition { from, to });
                }
                self.status = to;
                Ok(OrderActionResult::Transitioned { from, to })
            }
            OrderAction::AppendNote(note) => {
                if note.text.trim().is_empty() {
                    return Err(OrderError::ValidationError("note text is empty".to_string()));
                }
                self.messages.push(note);
                Ok(OrderActionResult::NoteAppended {
                    thread_len: self.messages.len(),
                })
            }
            OrderAction::RecordStockRemoved(removed) => {
                if removed.len() != self.items.len() {
                    return Err(OrderError::ValidationError(format!(
                        "{}: {} stock counts for {} items",
                        self.order_number,
                        removed.len(),
                        self.items.len()
                    )));
                }
                for (item, units) in self.items.iter_mut().zip(&removed) {
                    item.stock_removed = *units;
                }
                Ok(OrderActionResult::StockRecorded {
                    units: removed.iter().sum(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurrencyCode, CustomerInfo, NoteAuthor, OrderItem, OrderNote, OrderStatus, PaymentMethod};
    use crate::pricing::PriceBreakdown;
    use rust_decimal_macros::dec;

    fn params(payment_method: PaymentMethod) -> OrderCreate {
        OrderCreate {
            order_number: "ORD-1".into(),
            customer: CustomerInfo {
                name: "Mariam".into(),
                phone: "+971501234567".into(),
                ..Default::default()
            },
            items: vec![OrderItem {
                name: "Abaya".into(),
                product_id: "p1".into(),
                variant_id: None,
                options: "M".into(),
                quantity: 2,
                price: dec!(125),
                total: dec!(250),
                image: None,
                stock_removed: 0,
            }],
            currency: CurrencyCode::AED,
            breakdown: PriceBreakdown {
                subtotal: dec!(250),
                discount: dec!(25),
                subtotal_after_discount: dec!(225),
                shipping: dec!(0),
                tax: dec!(0),
                total: dec!(225),
            },
            coupon_id: Some("SAVE10".into()),
            payment_method,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_initial_status_follows_channel() {
        let order = Order::from_create_params("ORD-1".into(), params(PaymentMethod::HomeDelivery)).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        let order = Order::from_create_params("ORD-1".into(), params(PaymentMethod::BankTransfer)).unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingPayment);
    }

    #[test]
    fn test_rejects_unreconciled_totals() {
        let mut p = params(PaymentMethod::HomeDelivery);
        p.breakdown.total = dec!(230);
        assert!(matches!(
            Order::from_create_params("ORD-1".into(), p),
            Err(OrderError::ValidationError(_))
        ));
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let mut order = Order::from_create_params("ORD-1".into(), params(PaymentMethod::HomeDelivery)).unwrap();
        assert_eq!(
            order.handle_action(OrderAction::Transition(OrderStatus::Shipped)),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped
            })
        );
        assert_eq!(
            order.handle_action(OrderAction::Transition(OrderStatus::Confirmed)),
            Ok(OrderActionResult::Transitioned {
                from: OrderStatus::Pending,
                to: OrderStatus::Confirmed
            })
        );
    }

    #[test]
    fn test_notes_append_only_and_patch_refused() {
        let mut order = Order::from_create_params("ORD-1".into(), params(PaymentMethod::HomeDelivery)).unwrap();
        order
            .handle_action(OrderAction::AppendNote(OrderNote::new(NoteAuthor::Admin, "Packed")))
            .unwrap();
        assert_eq!(
            order.handle_action(OrderAction::AppendNote(OrderNote::new(NoteAuthor::Customer, "Thanks"))),
            Ok(OrderActionResult::NoteAppended { thread_len: 2 })
        );
        assert_eq!(order.on_update(()), Err(OrderError::Immutable("ORD-1".into())));
    }

    #[test]
    fn test_records_stock_removed_per_item() {
        let mut order = Order::from_create_params("ORD-1".into(), params(PaymentMethod::HomeDelivery)).unwrap();
        assert!(matches!(
            order.handle_action(OrderAction::RecordStockRemoved(vec![1, 1])),
            Err(OrderError::ValidationError(_))
        ));
        assert_eq!(
            order.handle_action(OrderAction::RecordStockRemoved(vec![1])),
            Ok(OrderActionResult::StockRecorded { units: 1 })
        );
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].stock_removed, 1);
    }

    #[test]
    fn test_version_counts_accepted_changes() {
        let mut order = Order::from_create_params("ORD-1".into(), params(PaymentMethod::HomeDelivery)).unwrap();
        assert_eq!(order.version, 0);
        order
            .handle_action(OrderAction::Transition(OrderStatus::Confirmed))
            .unwrap();
        order
            .handle_action(OrderAction::Transition(OrderStatus::Delivered))
            .unwrap_err();
        order
            .handle_action(OrderAction::AppendNote(OrderNote::new(NoteAuthor::Admin, "Packed")))
            .unwrap();
        assert_eq!(order.version, 2);
    }
}
