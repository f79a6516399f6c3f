use std::fmt;

use thiserror::Error;

use crate::coupon_actor::CouponError;
use crate::inventory_actor::InventoryError;
use crate::order_actor::OrderError;

/// Step of a submission whose failure may leave a persisted order behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStep {
    PersistOrder,
    AdjustInventory,
    RecordStock,
    RedeemCoupon,
}

impl fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersistOrder => f.write_str("order persist"),
            Self::AdjustInventory => f.write_str("inventory adjustment"),
            Self::RecordStock => f.write_str("stock bookkeeping"),
            Self::RedeemCoupon => f.write_str("coupon redemption"),
        }
    }
}

/// Errors surfaced at the checkout boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("Coupon rejected: {0}")]
    Coupon(CouponError),
    #[error("Insufficient stock for {key}: requested {requested}, available {available}")]
    InsufficientStock { key: String, requested: u32, available: u32 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Order creation failed: {0}")]
    OrderCreationFailed(String),
    #[error("Order {order_number} left inconsistent after {step} failed: {cause}")]
    PartialSubmission {
        order_number: String,
        step: SubmissionStep,
        cause: String,
    },
}

impl CheckoutError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether resubmitting the same cart may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::OrderCreationFailed(_))
    }

    /// The single message shown to the customer. Step-level detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { reason, .. } => reason.clone(),
            Self::Coupon(e) => e.user_message(),
            Self::InsufficientStock { .. } => {
                "Some items in your cart are no longer available in the requested quantity.".to_string()
            }
            Self::Network(_) => "We couldn't reach the store. Please check your connection and try again.".to_string(),
            Self::OrderCreationFailed(_) => "We couldn't place your order. Please try again.".to_string(),
            Self::PartialSubmission { order_number, .. } => format!(
                "Your order {order_number} was received but needs a manual check. Our team will contact you."
            ),
        }
    }
}

impl From<CouponError> for CheckoutError {
    fn from(e: CouponError) -> Self {
        match e {
            CouponError::ActorCommunicationError(cause) => Self::Network(cause),
            e if e.is_rejection() => Self::Coupon(e),
            other => Self::OrderCreationFailed(other.to_string()),
        }
    }
}

impl From<InventoryError> for CheckoutError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::InsufficientStock { key, requested, available } => Self::InsufficientStock {
                key,
                requested,
                available,
            },
            InventoryError::ActorCommunicationError(cause) => Self::Network(cause),
            other => Self::OrderCreationFailed(other.to_string()),
        }
    }
}

impl From<OrderError> for CheckoutError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::ActorCommunicationError(cause) => Self::Network(cause),
            other => Self::OrderCreationFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupon_rejections_keep_their_reason() {
        let err = CheckoutError::from(CouponError::Expired("EXPIRED2024".into()));
        assert_eq!(err, CheckoutError::Coupon(CouponError::Expired("EXPIRED2024".into())));
        assert_eq!(err.user_message(), "This coupon has expired.");
    }

    #[test]
    fn test_timeouts_become_network_errors() {
        let err = CheckoutError::from(OrderError::ActorCommunicationError("Request timed out after 5s".into()));
        assert!(matches!(err, CheckoutError::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_persistence_failures_hide_detail_from_customer() {
        let err = CheckoutError::from(OrderError::ValidationError("ORD-1: no line items".into()));
        assert_eq!(err.user_message(), "We couldn't place your order. Please try again.");
        assert!(err.to_string().contains("no line items"));
    }
}
