use chrono::Utc;
use tracing::{error, info, instrument, warn, Span};

use super::handoff::{compose_message, WhatsappHandoff};
use super::order_number::OrderNumberGenerator;
use super::validation::validate_customer;
use super::{CheckoutRequest, CheckoutSettings, OrderDraft};
use crate::clients::{CouponClient, InventoryClient, OrderClient, StockAdjustment};
use crate::domain::{
    format_money, Cart, CartLine, DiscountDescriptor, NoteAuthor, OrderItem, OrderNote, OrderStatus, PaymentMethod,
    StockKey, StockPolicy,
};
use crate::error::{CheckoutError, SubmissionStep};
use crate::inventory_actor::InventoryError;
use crate::order_actor::OrderError;
use crate::pricing::{PriceBreakdown, PricingEngine};

/// Attempts at finding a free order number before giving up.
const MAX_NUMBER_ATTEMPTS: usize = 3;

/// A priced cart, with the coupon that produced its discount.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub breakdown: PriceBreakdown,
    pub coupon: Option<DiscountDescriptor>,
}

/// How a successful submission ended, per fulfillment channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Persisted and ready for fulfillment (cash on delivery).
    Placed {
        order_number: String,
        breakdown: PriceBreakdown,
    },
    /// Persisted, waiting for an external payment. `notice` tells the customer what to do.
    AwaitingPayment {
        order_number: String,
        breakdown: PriceBreakdown,
        notice: String,
    },
    /// Nothing persisted; the merchant confirms over WhatsApp.
    HandedOff { url: String, message: String },
}

impl SubmissionOutcome {
    pub fn order_number(&self) -> Option<&str> {
        match self {
            Self::Placed { order_number, .. } | Self::AwaitingPayment { order_number, .. } => Some(order_number),
            Self::HandedOff { .. } => None,
        }
    }
}

/// Orchestrates a checkout: validate, price, persist, adjust stock, redeem the coupon.
///
/// Steps run strictly in sequence. If a step after the order persist fails, the
/// completed steps are compensated (coupon use given back, stock returned, order
/// cancelled with a system note) before the error is returned. A step whose
/// reply never arrived counts as possibly applied. Dropping the `submit` future
/// abandons the remaining steps.
pub struct OrderSubmissionCoordinator {
    coupons: CouponClient,
    inventory: InventoryClient,
    orders: OrderClient,
    pricing: PricingEngine,
    stock_policy: StockPolicy,
    handoff: WhatsappHandoff,
    bank_transfer_details: String,
    numbers: OrderNumberGenerator,
}

impl OrderSubmissionCoordinator {
    pub fn new(coupons: CouponClient, inventory: InventoryClient, orders: OrderClient, settings: CheckoutSettings) -> Self {
        Self {
            coupons,
            inventory,
            orders,
            pricing: settings.pricing,
            stock_policy: settings.stock_policy,
            handoff: settings.handoff,
            bank_transfer_details: settings.bank_transfer_details,
            numbers: OrderNumberGenerator::new(),
        }
    }

    /// Prices the cart, validating `coupon_code` against its subtotal when given.
    #[instrument(skip(self, cart), fields(lines = cart.lines().len()))]
    pub async fn quote(&self, cart: &Cart, coupon_code: Option<&str>) -> Result<Quote, CheckoutError> {
        let coupon = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => {
                let subtotal = self.pricing.subtotal(cart.lines());
                Some(self.coupons.validate(code, subtotal).await?)
            }
            None => None,
        };
        let breakdown = self.pricing.price(cart.lines(), coupon.as_ref());
        Ok(Quote { breakdown, coupon })
    }

    /// Submits the cart through the requested channel.
    ///
    /// The cart is cleared only when an order was persisted; a WhatsApp handoff
    /// leaves it intact.
    #[instrument(
        skip(self, cart, request),
        fields(channel = ?request.payment_method, order_number = tracing::field::Empty)
    )]
    pub async fn submit(&self, cart: &mut Cart, request: CheckoutRequest) -> Result<SubmissionOutcome, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::validation("cart", "Your cart is empty."));
        }
        validate_customer(&request.customer, request.payment_method)?;

        let quote = self.quote(cart, request.coupon_code.as_deref()).await?;
        let draft = OrderDraft {
            customer: request.customer,
            payment_method: request.payment_method,
            items: cart.lines().iter().map(OrderItem::from).collect(),
            currency: cart.currency(),
            breakdown: quote.breakdown,
            coupon: quote.coupon,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };

        if draft.payment_method == PaymentMethod::Whatsapp {
            let message = compose_message(&draft);
            let url = self.handoff.url(&message);
            info!(total = %draft.breakdown.total, "Order handed off to WhatsApp");
            return Ok(SubmissionOutcome::HandedOff { url, message });
        }

        if self.stock_policy == StockPolicy::Strict {
            self.check_stock(cart.lines()).await?;
        }

        let order_number = self.persist(&draft).await?;
        Span::current().record("order_number", order_number.as_str());

        let mut adjustments = Vec::new();
        if let Err((step, cause)) = self
            .apply_side_effects(&order_number, cart.lines(), draft.coupon.as_ref(), &mut adjustments)
            .await
        {
            let redeem_pending = draft.coupon.as_ref().filter(|_| step == SubmissionStep::RedeemCoupon);
            return Err(self
                .reconcile(&order_number, step, cause, &adjustments, redeem_pending)
                .await);
        }

        cart.clear();
        info!(total = %draft.breakdown.total, "Order placed");

        let breakdown = draft.breakdown;
        Ok(match draft.payment_method {
            PaymentMethod::BankTransfer => SubmissionOutcome::AwaitingPayment {
                notice: self.bank_transfer_notice(&order_number, &format_money(breakdown.total, draft.currency)),
                order_number,
                breakdown,
            },
            PaymentMethod::Online => SubmissionOutcome::AwaitingPayment {
                notice: format!("Order {order_number} is awaiting payment confirmation."),
                order_number,
                breakdown,
            },
            PaymentMethod::HomeDelivery | PaymentMethod::Whatsapp => SubmissionOutcome::Placed {
                order_number,
                breakdown,
            },
        })
    }

    /// Administrative cancellation: moves the order to `cancelled`, returns the
    /// stock it actually took and gives back the coupon use. Stock and coupon
    /// failures are logged, not returned, since the order itself is already
    /// cancelled.
    #[instrument(skip(self, reason))]
    pub async fn cancel_order(&self, order_number: String, reason: &str) -> Result<(), CheckoutError> {
        let order = self.orders.track(order_number.clone(), None).await?;
        self.orders.transition(order_number.clone(), OrderStatus::Cancelled).await?;

        for item in order.items.iter().filter(|item| item.stock_removed > 0) {
            match self.inventory.restock(item.stock_key(), item.stock_removed).await {
                Ok(_) | Err(InventoryError::NotFound(_)) => {}
                Err(e) => warn!(sku = %item.stock_key(), error = %e, "Failed to return stock"),
            }
        }
        if let Some(coupon_id) = order.coupon_id {
            if let Err(e) = self.coupons.release(coupon_id.clone(), order_number.clone()).await {
                warn!(coupon = %coupon_id, error = %e, "Failed to release coupon use");
            }
        }
        self.orders
            .append_note(order_number, OrderNote::new(NoteAuthor::Admin, format!("Cancelled: {reason}")))
            .await?;
        info!("Order cancelled");
        Ok(())
    }

    async fn check_stock(&self, lines: &[CartLine]) -> Result<(), CheckoutError> {
        let mut wanted: Vec<(StockKey, u32)> = Vec::new();
        for line in lines {
            let key = line.stock_key();
            match wanted.iter_mut().find(|(k, _)| *k == key) {
                Some((_, quantity)) => *quantity += line.quantity,
                None => wanted.push((key, line.quantity)),
            }
        }
        for (key, requested) in wanted {
            match self.inventory.stock_level(key.clone()).await {
                Ok(available) if available < requested => {
                    warn!(sku = %key, requested, available, "Insufficient stock");
                    return Err(CheckoutError::InsufficientStock {
                        key: key.to_string(),
                        requested,
                        available,
                    });
                }
                Ok(_) | Err(InventoryError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn persist(&self, draft: &OrderDraft) -> Result<String, CheckoutError> {
        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let order_number = self.numbers.next_number();
            match self.orders.create_order(draft.to_create(order_number.clone(), Utc::now())).await {
                Ok(order_number) => return Ok(order_number),
                Err(OrderError::AlreadyExists(taken)) => {
                    warn!(attempt, order_number = %taken, "Order number already taken, regenerating");
                }
                Err(OrderError::ActorCommunicationError(reason)) => {
                    error!(%order_number, error = %reason, "No reply to order create");
                    return Err(self.settle_unanswered_create(order_number, reason).await);
                }
                Err(e) => {
                    error!(error = %e, "Failed to persist order");
                    return Err(e.into());
                }
            }
        }
        Err(CheckoutError::OrderCreationFailed(
            "could not allocate a unique order number".to_string(),
        ))
    }

    /// Finds out whether a create that got no reply went through. The store
    /// handles requests in order, so the lookup sees the create if it ran.
    /// An order that exists is cancelled so it cannot linger as `pending`.
    async fn settle_unanswered_create(&self, order_number: String, reason: String) -> CheckoutError {
        let cause = CheckoutError::Network(reason);
        match self.orders.track(order_number.clone(), None).await {
            Err(OrderError::NotFound(_)) => cause,
            Ok(_) => {
                Span::current().record("order_number", order_number.as_str());
                self.reconcile(&order_number, SubmissionStep::PersistOrder, cause, &[], None)
                    .await
            }
            Err(e) => {
                error!(error = %e, "Could not tell whether the order was persisted");
                CheckoutError::PartialSubmission {
                    order_number,
                    step: SubmissionStep::PersistOrder,
                    cause: cause.to_string(),
                }
            }
        }
    }

    /// Runs the post-persist steps, recording each stock adjustment so it can be undone.
    async fn apply_side_effects(
        &self,
        order_number: &str,
        lines: &[CartLine],
        coupon: Option<&DiscountDescriptor>,
        adjustments: &mut Vec<StockAdjustment>,
    ) -> Result<(), (SubmissionStep, CheckoutError)> {
        let mut removed = vec![0; lines.len()];
        for (line, slot) in lines.iter().zip(removed.iter_mut()) {
            let key = line.stock_key();
            let result = match self.stock_policy {
                StockPolicy::AllowOversell => self.inventory.decrement(key.clone(), line.quantity).await,
                StockPolicy::Strict => self.inventory.reserve(key.clone(), line.quantity).await,
            };
            match result {
                Ok(adjustment) => {
                    if adjustment.removed() < line.quantity {
                        warn!(sku = %key, requested = line.quantity, removed = adjustment.removed(), "Oversold");
                    }
                    *slot = adjustment.removed();
                    adjustments.push(adjustment);
                }
                Err(InventoryError::NotFound(_)) => {
                    warn!(sku = %key, "Stock not tracked, skipping decrement");
                }
                Err(e) => return Err((SubmissionStep::AdjustInventory, CheckoutError::from(e))),
            }
        }

        if removed.iter().any(|units| *units > 0) {
            self.orders
                .record_stock_removed(order_number.to_string(), removed)
                .await
                .map_err(|e| (SubmissionStep::RecordStock, CheckoutError::from(e)))?;
        }

        if let Some(coupon) = coupon {
            self.coupons
                .redeem(coupon.id.clone(), order_number.to_string())
                .await
                .map_err(|e| (SubmissionStep::RedeemCoupon, CheckoutError::from(e)))?;
        }
        Ok(())
    }

    /// Undoes the completed steps of a failed submission, newest first.
    ///
    /// `redeemed` is the coupon whose redemption failed. Unless the coupon
    /// itself refused, the use may have been taken, so it is released; release
    /// is a no-op for an order that holds no use.
    async fn reconcile(
        &self,
        order_number: &str,
        step: SubmissionStep,
        cause: CheckoutError,
        adjustments: &[StockAdjustment],
        redeemed: Option<&DiscountDescriptor>,
    ) -> CheckoutError {
        error!(%step, error = %cause, "Submission failed after the order was persisted, reconciling");
        let mut failures = Vec::new();

        if let Some(coupon) = redeemed.filter(|_| !matches!(cause, CheckoutError::Coupon(_))) {
            if let Err(e) = self.coupons.release(coupon.id.clone(), order_number.to_string()).await {
                failures.push(format!("release coupon {}: {e}", coupon.id));
            }
        }

        for adjustment in adjustments.iter().rev().filter(|a| a.removed() > 0) {
            if let Err(e) = self.inventory.restock(adjustment.key.clone(), adjustment.removed()).await {
                failures.push(format!("restock {}: {e}", adjustment.key));
            }
        }
        if let Err(e) = self
            .orders
            .transition(order_number.to_string(), OrderStatus::Cancelled)
            .await
        {
            failures.push(format!("cancel order: {e}"));
        } else {
            let note = OrderNote::new(NoteAuthor::System, format!("Cancelled automatically: {step} failed ({cause})"));
            if let Err(e) = self.orders.append_note(order_number.to_string(), note).await {
                failures.push(format!("append note: {e}"));
            }
        }

        if !failures.is_empty() {
            error!(failures = ?failures, "Reconciliation incomplete, order needs manual follow-up");
            return CheckoutError::PartialSubmission {
                order_number: order_number.to_string(),
                step,
                cause: cause.to_string(),
            };
        }

        warn!("Submission rolled back");
        match cause {
            CheckoutError::Coupon(_) | CheckoutError::InsufficientStock { .. } => cause,
            other => CheckoutError::OrderCreationFailed(format!("{step} failed: {other}")),
        }
    }

    fn bank_transfer_notice(&self, order_number: &str, total: &str) -> String {
        let mut notice = format!("Please transfer {total} quoting order {order_number} as the reference.");
        if !self.bank_transfer_details.trim().is_empty() {
            notice.push('\n');
            notice.push_str(self.bank_transfer_details.trim());
        }
        notice
    }
}
