//! Cart pricing: subtotal, discount, shipping, tax and total.
//!
//! Pure and deterministic. The same inputs always produce the same
//! [`PriceBreakdown`], which is what lets checkout re-price the cart at
//! submission time and compare against what the customer saw.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{round_money, CartLine, DiscountDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub enabled: bool,
    pub free_shipping_threshold: Decimal,
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            free_shipping_threshold: Decimal::from(200),
            flat_fee: Decimal::from(25),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub rate_percent: Decimal,
}

/// Every amount is non-negative and rounded to 2 places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub subtotal_after_discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PricingEngine {
    pub shipping: ShippingPolicy,
    pub tax: TaxPolicy,
}

impl PricingEngine {
    pub fn new(shipping: ShippingPolicy, tax: TaxPolicy) -> Self {
        Self { shipping, tax }
    }

    pub fn subtotal(&self, lines: &[CartLine]) -> Decimal {
        round_money(lines.iter().map(CartLine::line_total).sum())
    }

    pub fn price(&self, lines: &[CartLine], discount: Option<&DiscountDescriptor>) -> PriceBreakdown {
        let subtotal = self.subtotal(lines);
        let discount = discount.map_or(Decimal::ZERO, |d| d.amount_for(subtotal));
        let subtotal_after_discount = subtotal - discount;

        let shipping = if self.shipping.enabled && subtotal_after_discount >= self.shipping.free_shipping_threshold {
            Decimal::ZERO
        } else {
            round_money(self.shipping.flat_fee)
        };
        let tax = round_money(subtotal_after_discount * self.tax.rate_percent / Decimal::ONE_HUNDRED);

        PriceBreakdown {
            subtotal,
            discount,
            subtotal_after_discount,
            shipping,
            tax,
            total: subtotal_after_discount + shipping + tax,
        }
    }
}
