use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

/// A promotional code with its activation rules.
///
/// The id is the normalized (upper-cased) code, so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_type: DiscountKind,
    pub discount_value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<u32>,
    pub used_count: u32,
    pub is_active: bool,
    /// Orders holding one of the `used_count` uses. Seeded uses have no entry.
    pub redeemed_by: BTreeSet<String>,
}

/// Payload for creating a coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponCreate {
    pub code: String,
    pub discount_type: DiscountKind,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CouponCreate {
    pub fn new(code: impl Into<String>, discount_type: DiscountKind, discount_value: Decimal) -> Self {
        Self {
            code: code.into(),
            discount_type,
            discount_value,
            min_order_amount: None,
            expires_at: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
        }
    }
}

/// What a successful validation hands to pricing and submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountDescriptor {
    pub id: String,
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
}

impl DiscountDescriptor {
    /// Discount against `subtotal`, rounded and never larger than the subtotal.
    pub fn amount_for(&self, subtotal: Decimal) -> Decimal {
        let raw = match self.kind {
            DiscountKind::Percentage => subtotal * self.value / Decimal::ONE_HUNDRED,
            DiscountKind::Fixed => self.value,
        };
        round_money(raw.max(Decimal::ZERO).min(subtotal))
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
