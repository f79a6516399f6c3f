//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STORE_CURRENCY` - ISO code of the store currency (default: AED)
//! - `SHIPPING_ENABLED` - Whether free shipping above the threshold applies (default: true)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal after discount that ships free (default: 200)
//! - `SHIPPING_FEE` - Flat shipping fee (default: 25)
//! - `TAX_RATE_PERCENT` - Tax on the discounted subtotal (default: 0)
//! - `WHATSAPP_NUMBER` - Merchant number for the WhatsApp channel
//! - `WHATSAPP_ENDPOINT` - Handoff URL template with `{phone}` and `{text}` (default: wa.me)
//! - `BANK_TRANSFER_DETAILS` - Account details shown for bank transfer orders
//! - `STORE_WRITE_TIMEOUT_MS` - Bound on every store request (default: 5000)
//! - `STOCK_POLICY` - `allow_oversell` or `strict` (default: allow_oversell)
//! - `ACTOR_BUFFER_SIZE` - Mailbox size of each resource actor (default: 32)

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::checkout::handoff::DEFAULT_WHATSAPP_ENDPOINT;
use crate::checkout::{CheckoutSettings, WhatsappHandoff};
use crate::domain::{CurrencyCode, StockPolicy};
use crate::pricing::{PricingEngine, ShippingPolicy, TaxPolicy};

const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ACTOR_BUFFER_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub currency: CurrencyCode,
    pub shipping: ShippingPolicy,
    pub tax: TaxPolicy,
    pub whatsapp: WhatsappHandoff,
    pub bank_transfer_details: String,
    /// Bound on each request to a resource actor
    pub write_timeout: Duration,
    pub stock_policy: StockPolicy,
    pub actor_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            shipping: ShippingPolicy::default(),
            tax: TaxPolicy::default(),
            whatsapp: WhatsappHandoff::default(),
            bank_transfer_details: String::new(),
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
            stock_policy: StockPolicy::default(),
            actor_buffer_size: DEFAULT_ACTOR_BUFFER_SIZE,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let shipping = ShippingPolicy {
            enabled: parse_env_or("SHIPPING_ENABLED", defaults.shipping.enabled)?,
            free_shipping_threshold: parse_decimal_or("FREE_SHIPPING_THRESHOLD", defaults.shipping.free_shipping_threshold)?,
            flat_fee: parse_decimal_or("SHIPPING_FEE", defaults.shipping.flat_fee)?,
        };
        let tax = TaxPolicy {
            rate_percent: parse_decimal_or("TAX_RATE_PERCENT", defaults.tax.rate_percent)?,
        };
        if tax.rate_percent > Decimal::ONE_HUNDRED {
            return Err(ConfigError::InvalidEnvVar(
                "TAX_RATE_PERCENT".to_string(),
                "must be between 0 and 100".to_string(),
            ));
        }

        let actor_buffer_size = parse_env_or("ACTOR_BUFFER_SIZE", defaults.actor_buffer_size)?;
        if actor_buffer_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ACTOR_BUFFER_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            currency: parse_env_or("STORE_CURRENCY", defaults.currency)?,
            shipping,
            tax,
            whatsapp: WhatsappHandoff::new(
                get_optional_env("WHATSAPP_NUMBER").unwrap_or_default(),
                get_env_or_default("WHATSAPP_ENDPOINT", DEFAULT_WHATSAPP_ENDPOINT),
            ),
            bank_transfer_details: get_optional_env("BANK_TRANSFER_DETAILS").unwrap_or_default(),
            write_timeout: Duration::from_millis(parse_env_or("STORE_WRITE_TIMEOUT_MS", DEFAULT_WRITE_TIMEOUT_MS)?),
            stock_policy: parse_env_or("STOCK_POLICY", defaults.stock_policy)?,
            actor_buffer_size,
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            pricing: PricingEngine::new(self.shipping.clone(), self.tax.clone()),
            stock_policy: self.stock_policy,
            handoff: self.whatsapp.clone(),
            bank_transfer_details: self.bank_transfer_details.clone(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parses a non-negative decimal amount.
fn parse_decimal_or(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    let value: Decimal = parse_env_or(key, default)?;
    if value.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(key.to_string(), "must not be negative".to_string()));
    }
    Ok(value)
}
