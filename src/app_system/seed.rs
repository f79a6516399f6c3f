//! Fixture records (coupons, stock counts) parsed at the storage boundary.
//!
//! ```json
//! {
//!   "coupons": [{ "code": "SAVE10", "discount_type": "percentage", "discount_value": "10",
//!                 "min_order_amount": "100", "max_uses": 50 }],
//!   "stock": [{ "key": { "kind": "variant", "id": "abaya-m" }, "quantity": 5 }]
//! }
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{normalize_code, CouponCreate, DiscountKind, StockKey};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Malformed seed data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid coupon {code}: {reason}")]
    InvalidCoupon { code: String, reason: String },
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Failed to store {key}: {cause}")]
    Store { key: String, cause: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StockSeed {
    pub key: StockKey,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub coupons: Vec<CouponCreate>,
    #[serde(default)]
    pub stock: Vec<StockSeed>,
}

impl SeedData {
    /// Parses and validates. Nothing is stored if any record is rejected.
    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        let seed: Self = serde_json::from_str(raw)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        let mut codes = HashSet::new();
        for coupon in &self.coupons {
            let code = normalize_code(&coupon.code);
            let invalid = |reason: &str| RecordError::InvalidCoupon {
                code: code.clone(),
                reason: reason.to_string(),
            };
            if code.is_empty() {
                return Err(invalid("empty code"));
            }
            if coupon.discount_value < Decimal::ZERO {
                return Err(invalid("negative discount value"));
            }
            if coupon.discount_type == DiscountKind::Percentage && coupon.discount_value > Decimal::ONE_HUNDRED {
                return Err(invalid("percentage above 100"));
            }
            if coupon.min_order_amount.is_some_and(|min| min < Decimal::ZERO) {
                return Err(invalid("negative minimum order amount"));
            }
            if coupon.max_uses.is_some_and(|max| coupon.used_count > max) {
                return Err(invalid("used_count exceeds max_uses"));
            }
            if !codes.insert(code.clone()) {
                return Err(RecordError::Duplicate(format!("coupon {code}")));
            }
        }

        let mut keys = HashSet::new();
        for record in &self.stock {
            if !keys.insert(&record.key) {
                return Err(RecordError::Duplicate(record.key.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_coupons_and_stock() {
        let seed = SeedData::from_json(
            r#"{
                "coupons": [
                    { "code": "save10", "discount_type": "percentage", "discount_value": "10", "min_order_amount": "100" },
                    { "code": "FLAT20", "discount_type": "fixed", "discount_value": "20", "max_uses": 1, "used_count": 1 }
                ],
                "stock": [
                    { "key": { "kind": "product", "id": "scarf" }, "quantity": 2 },
                    { "key": { "kind": "variant", "id": "abaya-m" }, "quantity": 5 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.coupons.len(), 2);
        assert_eq!(seed.coupons[0].min_order_amount, Some(dec!(100)));
        assert!(seed.coupons[0].is_active);
        assert_eq!(seed.stock[1].key, StockKey::Variant("abaya-m".into()));
    }

    #[test]
    fn test_rejects_unknown_discount_kind() {
        let err = SeedData::from_json(
            r#"{ "coupons": [{ "code": "X", "discount_type": "bogo", "discount_value": "1" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Malformed(_)));
    }

    #[test]
    fn test_rejects_invariant_violations() {
        let over_used = r#"{ "coupons": [{ "code": "X", "discount_type": "fixed", "discount_value": "5", "max_uses": 1, "used_count": 2 }] }"#;
        assert!(matches!(
            SeedData::from_json(over_used),
            Err(RecordError::InvalidCoupon { reason, .. }) if reason == "used_count exceeds max_uses"
        ));

        let too_generous = r#"{ "coupons": [{ "code": "X", "discount_type": "percentage", "discount_value": "150" }] }"#;
        assert!(matches!(SeedData::from_json(too_generous), Err(RecordError::InvalidCoupon { .. })));
    }

    #[test]
    fn test_rejects_duplicate_codes_case_insensitively() {
        let seed = r#"{ "coupons": [
            { "code": "save10", "discount_type": "percentage", "discount_value": "10" },
            { "code": "SAVE10", "discount_type": "percentage", "discount_value": "15" }
        ] }"#;
        assert!(matches!(SeedData::from_json(seed), Err(RecordError::Duplicate(_))));
    }
}
