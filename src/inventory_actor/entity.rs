use crate::actor_framework::Entity;
use crate::domain::{InventoryCreate, InventoryPatch, InventoryRecord, StockKey};
use super::actions::{InventoryAction, InventoryActionResult};
use super::error::InventoryError;

impl Entity for InventoryRecord {
    type Id = StockKey;
    type CreateParams = InventoryCreate;
    type Patch = InventoryPatch;
    type Action = InventoryAction;
    type ActionResult = InventoryActionResult;
    type Error = InventoryError;

    fn id(&self) -> &StockKey {
        &self.key
    }

    fn from_create_params(key: StockKey, params: InventoryCreate) -> Result<Self, InventoryError> {
        Ok(Self {
            key,
            quantity: params.quantity,
        })
    }

    fn on_update(&mut self, patch: InventoryPatch) -> Result<(), InventoryError> {
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        Ok(())
    }

    /// Handles stock actions.
    ///
    /// # Errors
    /// `Reserve` fails if the record holds fewer units than requested. A zero
    /// quantity is rejected by every mutating action.
    fn handle_action(&mut self, action: InventoryAction) -> Result<InventoryActionResult, InventoryError> {
        let before = self.quantity;
        match action {
            InventoryAction::CheckStock => return Ok(InventoryActionResult::StockLevel(self.quantity)),
            InventoryAction::Decrement(0) | InventoryAction::Reserve(0) | InventoryAction::Restock(0) => {
                return Err(InventoryError::InvalidQuantity(0));
            }
            InventoryAction::Decrement(amount) => {
                self.quantity = self.quantity.saturating_sub(amount);
            }
            InventoryAction::Reserve(amount) => {
                if self.quantity < amount {
                    return Err(InventoryError::InsufficientStock {
                        key: self.key.to_string(),
                        requested: amount,
                        available: self.quantity,
                    });
                }
                self.quantity -= amount;
            }
            InventoryAction::Restock(amount) => {
                self.quantity = self.quantity.saturating_add(amount);
            }
        }
        Ok(InventoryActionResult::Adjusted {
            before,
            after: self.quantity,
        })
    }
}
