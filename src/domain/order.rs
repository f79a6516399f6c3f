use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::inventory::StockKey;
use super::money::{round_money, CurrencyCode};
use super::status::OrderStatus;
use crate::pricing::PriceBreakdown;

/// How the customer chose to complete the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    HomeDelivery,
    Whatsapp,
    BankTransfer,
    Online,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HomeDelivery => "Cash on Delivery",
            Self::Whatsapp => "WhatsApp Order",
            Self::BankTransfer => "Bank Transfer",
            Self::Online => "Online Payment",
        }
    }

    /// Status a freshly persisted order starts in.
    pub fn initial_status(&self) -> OrderStatus {
        match self {
            Self::BankTransfer | Self::Online => OrderStatus::AwaitingPayment,
            Self::HomeDelivery | Self::Whatsapp => OrderStatus::Pending,
        }
    }

    /// Channels that require a delivery address at checkout.
    pub fn requires_address(&self) -> bool {
        matches!(self, Self::HomeDelivery)
    }
}

/// Contact details captured at submission time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// Account the order belongs to; `None` for guest checkout.
    pub user_id: Option<String>,
}

/// Denormalized line snapshot. Later catalog edits never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    pub options: String,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Units actually taken from inventory at submission. Lower than
    /// `quantity` when the line was oversold, zero for untracked stock.
    #[serde(default)]
    pub stock_removed: u32,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            name: line.name.clone(),
            product_id: line.product_id.clone(),
            variant_id: line.variant_id.clone(),
            options: line.options_label(),
            quantity: line.quantity,
            price: line.unit_price.amount,
            total: round_money(line.line_total()),
            image: line.image.clone(),
            stock_removed: 0,
        }
    }
}

impl OrderItem {
    pub fn stock_key(&self) -> StockKey {
        StockKey::for_selection(&self.product_id, self.variant_id.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteAuthor {
    Customer,
    Admin,
    System,
}

/// Entry in the order's append-only message thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNote {
    pub author: NoteAuthor,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl OrderNote {
    pub fn new(author: NoteAuthor, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: String,
    pub user_id: Option<String>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub customer_city: Option<String>,
    pub items: Vec<OrderItem>,
    pub currency: CurrencyCode,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub coupon_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub messages: Vec<OrderNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by every accepted change. A copy with a lower version is stale.
    #[serde(default)]
    pub version: u64,
}

impl Order {
    /// `total == subtotal - discount + shipping + tax`.
    pub fn reconciles(&self) -> bool {
        self.total == self.subtotal - self.discount + self.shipping + self.tax
    }

    /// Case-insensitive match against the captured contact email.
    pub fn matches_email(&self, email: &str) -> bool {
        self.customer_email
            .as_deref()
            .is_some_and(|stored| stored.trim().eq_ignore_ascii_case(email.trim()))
    }

    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// Payload for persisting an order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub order_number: String,
    pub customer: CustomerInfo,
    pub items: Vec<OrderItem>,
    pub currency: CurrencyCode,
    pub breakdown: PriceBreakdown,
    pub coupon_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
