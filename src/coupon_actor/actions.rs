/// Custom actions for Coupon entities.
///
/// Both run inside the coupon actor, so the read of `used_count` and the
/// write of its new value cannot interleave with another redemption.
/// Both are keyed by order number and idempotent per order.
#[derive(Debug, Clone)]
pub enum CouponAction {
    /// Takes one use for `order_number`. Repeating it for the same order
    /// changes nothing.
    ///
    /// # Errors
    /// Fails with `UsageExhausted` if the cap was already reached, and with
    /// `InvalidCode` if the coupon has been deactivated.
    Redeem { order_number: String },
    /// Gives back the use held by `order_number`, if it holds one.
    Release { order_number: String },
}

/// Results from CouponActions - variants match 1:1 with CouponAction
#[derive(Debug, Clone, PartialEq)]
pub enum CouponActionResult {
    Redeemed { used_count: u32 },
    Released { used_count: u32, released: bool },
}
