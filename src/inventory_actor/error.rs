use thiserror::Error;

use crate::actor_framework::FrameworkError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    #[error("Stock record not found: {0}")]
    NotFound(String),
    #[error("Stock record already exists: {0}")]
    AlreadyExists(String),
    #[error("Insufficient stock for {key}: requested {requested}, available {available}")]
    InsufficientStock { key: String, requested: u32, available: u32 },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<InventoryError>> for InventoryError {
    fn from(e: FrameworkError<InventoryError>) -> Self {
        match e {
            FrameworkError::Entity(inner) => inner,
            FrameworkError::NotFound(key) => Self::NotFound(key),
            FrameworkError::AlreadyExists(key) => Self::AlreadyExists(key),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}
