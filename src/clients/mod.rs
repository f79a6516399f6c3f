//! Typed clients over the resource actors.
//!
//! Each client owns a [`ResourceClient`](crate::actor_framework::ResourceClient)
//! and exposes the domain operations of one collection.

#[macro_use]
mod macros;
mod coupon_client;
mod inventory_client;
mod order_client;

pub use coupon_client::CouponClient;
pub use inventory_client::{InventoryClient, StockAdjustment};
pub use order_client::OrderClient;
