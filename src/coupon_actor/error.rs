use rust_decimal::Decimal;
use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during coupon operations.
///
/// The first four variants are customer-facing rejection reasons; each has
/// its own message in [`CouponError::user_message`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CouponError {
    #[error("Invalid coupon code: {0}")]
    InvalidCode(String),
    #[error("Coupon expired: {0}")]
    Expired(String),
    #[error("Minimum order amount of {minimum} not met (subtotal {subtotal})")]
    MinimumNotMet { minimum: Decimal, subtotal: Decimal },
    #[error("Coupon usage limit reached: {0}")]
    UsageExhausted(String),
    #[error("Invalid coupon record: {0}")]
    InvalidRecord(String),
    #[error("Coupon already exists: {0}")]
    AlreadyExists(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl CouponError {
    /// True for the rejection reasons a customer can act on.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidCode(_) | Self::Expired(_) | Self::MinimumNotMet { .. } | Self::UsageExhausted(_)
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCode(_) => "This coupon code is not valid.".to_string(),
            Self::Expired(_) => "This coupon has expired.".to_string(),
            Self::MinimumNotMet { minimum, .. } => {
                format!("A minimum order of {minimum:.2} is required to use this coupon.")
            }
            Self::UsageExhausted(_) => "This coupon has reached its usage limit.".to_string(),
            Self::InvalidRecord(_) | Self::AlreadyExists(_) | Self::ActorCommunicationError(_) => {
                "We couldn't apply this coupon right now. Please try again.".to_string()
            }
        }
    }
}

impl From<FrameworkError<CouponError>> for CouponError {
    fn from(e: FrameworkError<CouponError>) -> Self {
        match e {
            FrameworkError::Entity(inner) => inner,
            FrameworkError::NotFound(code) => Self::InvalidCode(code),
            FrameworkError::AlreadyExists(code) => Self::AlreadyExists(code),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}
