//! Turning a priced cart into an order, across the fulfillment channels.

mod coordinator;
pub mod handoff;
pub mod order_number;
pub mod validation;

use chrono::{DateTime, Utc};

use crate::domain::{CurrencyCode, CustomerInfo, DiscountDescriptor, OrderCreate, OrderItem, PaymentMethod, StockPolicy};
use crate::pricing::{PriceBreakdown, PricingEngine};

pub use coordinator::*;
pub use handoff::WhatsappHandoff;
pub use order_number::OrderNumberGenerator;

/// What the customer submits alongside the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
}

/// Policies the coordinator applies, taken from the store configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckoutSettings {
    pub pricing: PricingEngine,
    pub stock_policy: StockPolicy,
    pub handoff: WhatsappHandoff,
    pub bank_transfer_details: String,
}

/// Fully priced order that has not been given a number yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    pub currency: CurrencyCode,
    pub breakdown: PriceBreakdown,
    pub coupon: Option<DiscountDescriptor>,
    pub notes: Option<String>,
}

impl OrderDraft {
    pub fn to_create(&self, order_number: String, created_at: DateTime<Utc>) -> OrderCreate {
        OrderCreate {
            order_number,
            customer: self.customer.clone(),
            items: self.items.clone(),
            currency: self.currency,
            breakdown: self.breakdown.clone(),
            coupon_id: self.coupon.as_ref().map(|c| c.id.clone()),
            payment_method: self.payment_method,
            notes: self.notes.clone(),
            created_at,
        }
    }
}
