use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::actor_framework::Entity;
use crate::domain::{normalize_code, Coupon, CouponCreate, DiscountDescriptor, DiscountKind};
use super::actions::{CouponAction, CouponActionResult};
use super::error::CouponError;

impl Entity for Coupon {
    type Id = String;
    type CreateParams = CouponCreate;
    type Patch = CouponPatch;
    type Action = CouponAction;
    type ActionResult = CouponActionResult;
    type Error = CouponError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a coupon keyed by its normalized code.
    ///
    /// # Errors
    /// Rejects records that already violate the coupon invariants.
    fn from_create_params(id: String, params: CouponCreate) -> Result<Self, CouponError> {
        if params.discount_value < Decimal::ZERO {
            return Err(CouponError::InvalidRecord(format!("{id}: negative discount value")));
        }
        if params.discount_type == DiscountKind::Percentage && params.discount_value > Decimal::ONE_HUNDRED {
            return Err(CouponError::InvalidRecord(format!("{id}: percentage above 100")));
        }
        if params.min_order_amount.is_some_and(|min| min < Decimal::ZERO) {
            return Err(CouponError::InvalidRecord(format!("{id}: negative minimum order amount")));
        }
        if params.max_uses.is_some_and(|max| params.used_count > max) {
            return Err(CouponError::InvalidRecord(format!("{id}: used_count exceeds max_uses")));
        }
        Ok(Self {
            code: normalize_code(&params.code),
            id,
            discount_type: params.discount_type,
            discount_value: params.discount_value,
            min_order_amount: params.min_order_amount,
            expires_at: params.expires_at,
            max_uses: params.max_uses,
            used_count: params.used_count,
            is_active: params.is_active,
            redeemed_by: Default::default(),
        })
    }

    fn on_update(&mut self, patch: CouponPatch) -> Result<(), CouponError> {
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(expires_at) = patch.expires_at {
            self.expires_at = expires_at;
        }
        if let Some(max_uses) = patch.max_uses {
            if max_uses.is_some_and(|max| self.used_count > max) {
                return Err(CouponError::InvalidRecord(format!(
                    "{}: max_uses below current used_count {}",
                    self.id, self.used_count
                )));
            }
            self.max_uses = max_uses;
        }
        Ok(())
    }

    /// Handles coupon-specific actions.
    ///
    /// # Actions
    /// - `Redeem`: increment-with-ceiling on `used_count`, once per order
    /// - `Release`: decrement for an order that holds a use
    fn handle_action(&mut self, action: CouponAction) -> Result<CouponActionResult, CouponError> {
        match action {
            CouponAction::Redeem { order_number } => {
                if self.redeemed_by.contains(&order_number) {
                    return Ok(CouponActionResult::Redeemed {
                        used_count: self.used_count,
                    });
                }
                if !self.is_active {
                    return Err(CouponError::InvalidCode(self.code.clone()));
                }
                if self.is_exhausted() {
                    return Err(CouponError::UsageExhausted(self.code.clone()));
                }
                self.used_count += 1;
                self.redeemed_by.insert(order_number);
                Ok(CouponActionResult::Redeemed {
                    used_count: self.used_count,
                })
            }
            CouponAction::Release { order_number } => {
                let released = self.redeemed_by.remove(&order_number);
                if released {
                    self.used_count = self.used_count.saturating_sub(1);
                }
                Ok(CouponActionResult::Released {
                    used_count: self.used_count,
                    released,
                })
            }
        }
    }
}

/// Administrative changes to a coupon. The usage counter is only touched by actions.
#[derive(Debug, Clone, Default)]
pub struct CouponPatch {
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub max_uses: Option<Option<u32>>,
}

impl Coupon {
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.used_count >= max)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < now)
    }

    /// Applies the acceptance rules in order: active, expiry, minimum, usage cap.
    pub fn check_redeemable(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<DiscountDescriptor, CouponError> {
        if !self.is_active {
            return Err(CouponError::InvalidCode(self.code.clone()));
        }
        if self.is_expired(now) {
            return Err(CouponError::Expired(self.code.clone()));
        }
        if let Some(minimum) = self.min_order_amount {
            if subtotal < minimum {
                return Err(CouponError::MinimumNotMet { minimum, subtotal });
            }
        }
        if self.is_exhausted() {
            return Err(CouponError::UsageExhausted(self.code.clone()));
        }
        Ok(DiscountDescriptor {
            id: self.id.clone(),
            code: self.code.clone(),
            kind: self.discount_type,
            value: self.discount_value,
        })
    }
}
