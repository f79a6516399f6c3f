use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::config::StoreConfig;
use super::seed::{RecordError, SeedData};
use crate::actor_framework::ResourceActor;
use crate::checkout::OrderSubmissionCoordinator;
use crate::clients::{CouponClient, InventoryClient, OrderClient};
use crate::domain::{normalize_code, Cart, Coupon, CouponCreate, InventoryCreate, InventoryRecord, Order, OrderCreate};

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("Actor task failed: {0}")]
    ActorTaskFailed(String),
}

/// The running store: one actor per collection plus the checkout coordinator.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct StoreSystem {
    pub coupons: CouponClient,
    pub inventory: InventoryClient,
    pub orders: OrderClient,
    pub checkout: OrderSubmissionCoordinator,
    config: StoreConfig,
    handles: Vec<JoinHandle<()>>,
}

impl StoreSystem {
    pub fn start(config: StoreConfig) -> Self {
        let buffer = config.actor_buffer_size;
        let timeout = config.write_timeout;

        // 1. Coupons, keyed by normalized code
        let (coupon_actor, coupon_resource) =
            ResourceActor::<Coupon>::new("coupons", buffer, |params: &CouponCreate| normalize_code(&params.code));
        let coupons = CouponClient::new(coupon_resource.with_timeout(timeout));
        let coupon_handle = tokio::spawn(coupon_actor.run());

        // 2. Stock records, keyed by product or variant
        let (inventory_actor, inventory_resource) =
            ResourceActor::<InventoryRecord>::new("inventory", buffer, |params: &InventoryCreate| params.key.clone());
        let inventory = InventoryClient::new(inventory_resource.with_timeout(timeout));
        let inventory_handle = tokio::spawn(inventory_actor.run());

        // 3. Orders, keyed by order number
        let (order_actor, order_resource) =
            ResourceActor::<Order>::new("orders", buffer, |params: &OrderCreate| params.order_number.clone());
        let orders = OrderClient::new(order_resource.with_timeout(timeout));
        let order_handle = tokio::spawn(order_actor.run());

        let checkout = OrderSubmissionCoordinator::new(
            coupons.clone(),
            inventory.clone(),
            orders.clone(),
            config.checkout_settings(),
        );

        info!(currency = %config.currency, stock_policy = ?config.stock_policy, "Store system started");
        Self {
            coupons,
            inventory,
            orders,
            checkout,
            config,
            handles: vec![coupon_handle, inventory_handle, order_handle],
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// An empty cart in the store currency.
    pub fn new_cart(&self) -> Cart {
        Cart::new(self.config.currency)
    }

    /// Stores validated fixture records. Stops at the first record the store rejects.
    #[instrument(skip_all, fields(coupons = seed.coupons.len(), stock = seed.stock.len()))]
    pub async fn load_seed(&self, seed: SeedData) -> Result<(), RecordError> {
        seed.validate()?;
        for coupon in seed.coupons {
            let code = normalize_code(&coupon.code);
            self.coupons
                .create_coupon(coupon)
                .await
                .map_err(|e| RecordError::Store {
                    key: format!("coupon {code}"),
                    cause: e.to_string(),
                })?;
        }
        for record in seed.stock {
            let key = record.key.to_string();
            self.inventory
                .create_record(record.key, record.quantity)
                .await
                .map_err(|e| RecordError::Store { key, cause: e.to_string() })?;
        }
        info!("Seed data loaded");
        Ok(())
    }

    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        info!("Shutting down system...");
        let Self {
            coupons,
            inventory,
            orders,
            checkout,
            handles,
            ..
        } = self;

        // Actors stop once every client holding their mailbox is gone.
        drop(checkout);
        drop(coupons);
        drop(inventory);
        drop(orders);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(ShutdownError::ActorTaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
