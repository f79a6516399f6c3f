use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::coupon_actor::entity::CouponPatch;
use crate::coupon_actor::{CouponAction, CouponActionResult, CouponError};
use crate::domain::{normalize_code, Coupon, CouponCreate, DiscountDescriptor};

/// Client for interacting with the Coupon actor.
#[derive(Clone)]
pub struct CouponClient {
    inner: ResourceClient<Coupon>,
}

crate::impl_basic_client!(CouponClient, Coupon, String, CouponError, coupon);

impl CouponClient {
    #[instrument(skip(self, params), fields(code = %params.code))]
    pub async fn create_coupon(&self, params: CouponCreate) -> Result<String, CouponError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(CouponError::from)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_coupon(&self, id: String, patch: CouponPatch) -> Result<Coupon, CouponError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(CouponError::from)
    }

    /// Validates `code` against the current subtotal.
    pub async fn validate(&self, code: &str, subtotal: Decimal) -> Result<DiscountDescriptor, CouponError> {
        self.validate_at(code, subtotal, Utc::now()).await
    }

    #[instrument(skip(self), fields(coupon = %normalize_code(code)))]
    pub async fn validate_at(
        &self,
        code: &str,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<DiscountDescriptor, CouponError> {
        let normalized = normalize_code(code);
        if normalized.is_empty() {
            return Err(CouponError::InvalidCode(normalized));
        }
        let coupon = self
            .inner
            .get(normalized.clone())
            .await
            .map_err(CouponError::from)?
            .ok_or(CouponError::InvalidCode(normalized))?;

        match coupon.check_redeemable(subtotal, now) {
            Ok(descriptor) => {
                info!(kind = ?descriptor.kind, value = %descriptor.value, "Coupon accepted");
                Ok(descriptor)
            }
            Err(e) => {
                warn!(reason = %e, "Coupon rejected");
                Err(e)
            }
        }
    }

    /// Atomically takes one use of the coupon for `order_number`. Returns the
    /// usage count after the call. Safe to repeat for the same order.
    #[instrument(skip(self))]
    pub async fn redeem(&self, id: String, order_number: String) -> Result<u32, CouponError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, CouponAction::Redeem { order_number })
            .await
        {
            Ok(CouponActionResult::Redeemed { used_count }) => Ok(used_count),
            Ok(_) => Err(CouponError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Gives back the use `order_number` took with [`CouponClient::redeem`].
    /// Does nothing if that order holds no use.
    #[instrument(skip(self))]
    pub async fn release(&self, id: String, order_number: String) -> Result<u32, CouponError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, CouponAction::Release { order_number })
            .await
        {
            Ok(CouponActionResult::Released { used_count, .. }) => Ok(used_count),
            Ok(_) => Err(CouponError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
