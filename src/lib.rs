//! Order processing pipeline for a retail storefront: cart pricing, coupon
//! validation and redemption, multi-channel order submission, inventory
//! adjustment, the order status lifecycle and its live fan-out to customers.
//!
//! Each stored collection (coupons, stock, orders) is owned by a
//! [`ResourceActor`](actor_framework::ResourceActor); typed clients in
//! [`clients`] talk to them, and [`StoreSystem`](app_system::StoreSystem)
//! wires everything together.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use storefront_orders::app_system::{StoreConfig, StoreSystem};
//!
//! let system = StoreSystem::start(StoreConfig::from_env()?);
//! let mut cart = system.new_cart();
//! // ... add lines, then system.checkout.submit(&mut cart, request).await
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod checkout;
pub mod clients;
pub mod coupon_actor;
pub mod domain;
pub mod error;
pub mod inventory_actor;
pub mod invoice;
pub mod order_actor;
pub mod pricing;
pub mod realtime;

#[cfg(test)]
mod mock_framework;
