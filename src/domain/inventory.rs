use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies a stock record: per product, or per variant when the product has variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StockKey {
    Product(String),
    Variant(String),
}

impl StockKey {
    /// The record a line draws from: the variant when one was chosen.
    pub fn for_selection(product_id: &str, variant_id: Option<&str>) -> Self {
        match variant_id {
            Some(variant) => Self::Variant(variant.to_string()),
            None => Self::Product(product_id.to_string()),
        }
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product(id) => write!(f, "product:{id}"),
            Self::Variant(id) => write!(f, "variant:{id}"),
        }
    }
}

/// Remaining purchasable quantity. Never negative by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    pub key: StockKey,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct InventoryCreate {
    pub key: StockKey,
    pub quantity: u32,
}

/// Catalog-management overwrite of a stock count.
#[derive(Debug, Clone)]
pub struct InventoryPatch {
    pub quantity: Option<u32>,
}

/// What checkout does when a line asks for more than is in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Decrement and clamp at zero; the order goes through.
    #[default]
    AllowOversell,
    /// Refuse the whole submission before anything is persisted.
    Strict,
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow_oversell" | "oversell" => Ok(Self::AllowOversell),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown stock policy: {other}")),
        }
    }
}
