use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{InventoryCreate, InventoryPatch, InventoryRecord, StockKey};
use crate::inventory_actor::{InventoryAction, InventoryActionResult, InventoryError};

/// Outcome of one stock adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct StockAdjustment {
    pub key: StockKey,
    pub before: u32,
    pub after: u32,
}

impl StockAdjustment {
    /// Units actually removed (less than requested when the decrement clamped).
    pub fn removed(&self) -> u32 {
        self.before.saturating_sub(self.after)
    }
}

/// Client for interacting with the Inventory actor.
#[derive(Clone)]
pub struct InventoryClient {
    inner: ResourceClient<InventoryRecord>,
}

crate::impl_basic_client!(InventoryClient, InventoryRecord, StockKey, InventoryError, record);

impl InventoryClient {
    #[instrument(skip(self))]
    pub async fn create_record(&self, key: StockKey, quantity: u32) -> Result<StockKey, InventoryError> {
        debug!("Sending request");
        self.inner
            .create(InventoryCreate { key, quantity })
            .await
            .map_err(InventoryError::from)
    }

    #[instrument(skip(self))]
    pub async fn set_stock(&self, key: StockKey, quantity: u32) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.inner
            .update(key, InventoryPatch { quantity: Some(quantity) })
            .await
            .map_err(InventoryError::from)
    }

    #[instrument(skip(self))]
    pub async fn stock_level(&self, key: StockKey) -> Result<u32, InventoryError> {
        debug!("Sending request");
        match self.inner.perform_action(key, InventoryAction::CheckStock).await {
            Ok(InventoryActionResult::StockLevel(level)) => Ok(level),
            Ok(_) => Err(InventoryError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes up to `quantity` units, never going below zero.
    pub async fn decrement(&self, key: StockKey, quantity: u32) -> Result<StockAdjustment, InventoryError> {
        self.adjust(key, InventoryAction::Decrement(quantity)).await
    }

    /// Removes exactly `quantity` units or fails with `InsufficientStock`.
    pub async fn reserve(&self, key: StockKey, quantity: u32) -> Result<StockAdjustment, InventoryError> {
        self.adjust(key, InventoryAction::Reserve(quantity)).await
    }

    pub async fn restock(&self, key: StockKey, quantity: u32) -> Result<StockAdjustment, InventoryError> {
        self.adjust(key, InventoryAction::Restock(quantity)).await
    }

    #[instrument(skip(self), fields(sku = %key))]
    async fn adjust(&self, key: StockKey, action: InventoryAction) -> Result<StockAdjustment, InventoryError> {
        debug!("Sending request");
        match self.inner.perform_action(key.clone(), action).await {
            Ok(InventoryActionResult::Adjusted { before, after }) => {
                debug!(before, after, "Stock adjusted");
                Ok(StockAdjustment { key, before, after })
            }
            Ok(_) => Err(InventoryError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
