//! The customer's cart as an explicit state container.
//!
//! A `Cart` is owned by one customer session and handed to the checkout
//! coordinator by `&mut` reference; nothing reads it from ambient state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::inventory::StockKey;
use super::money::{CurrencyCode, Price};

/// One chosen option on a line, e.g. `Size = M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

impl SelectedOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A product or variant in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
    pub options: Vec<SelectedOption>,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, unit_price: Price, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: None,
            name: name.into(),
            image: None,
            unit_price,
            quantity,
            options: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(SelectedOption::new(name, value));
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Unrounded `unit_price × quantity`.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.amount * Decimal::from(self.quantity)
    }

    /// Option values joined for display, e.g. `M / Red`.
    pub fn options_label(&self) -> String {
        self.options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// The stock record this line draws from: the variant when one was chosen.
    pub fn stock_key(&self) -> StockKey {
        StockKey::for_selection(&self.product_id, self.variant_id.as_deref())
    }

    fn same_selection(&self, other: &CartLine) -> bool {
        self.product_id == other.product_id
            && self.variant_id == other.variant_id
            && self.options == other.options
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart is priced in {expected}, line is priced in {found}")]
    CurrencyMismatch {
        expected: CurrencyCode,
        found: CurrencyCode,
    },
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),
    #[error("No cart line at position {0}")]
    LineNotFound(usize),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    currency: CurrencyCode,
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(currency: CurrencyCode) -> Self {
        Self {
            currency,
            lines: Vec::new(),
        }
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Adds a line, merging into an existing line with the same selection.
    pub fn add_line(&mut self, line: CartLine) -> Result<(), CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        if line.unit_price.currency != self.currency {
            return Err(CartError::CurrencyMismatch {
                expected: self.currency,
                found: line.unit_price.currency,
            });
        }
        match self.lines.iter_mut().find(|existing| existing.same_selection(&line)) {
            Some(existing) => existing.quantity += line.quantity,
            None => self.lines.push(line),
        }
        Ok(())
    }

    pub fn update_quantity(&mut self, index: usize, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let line = self.lines.get_mut(index).ok_or(CartError::LineNotFound(index))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::LineNotFound(index));
        }
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn shirt(size: &str) -> CartLine {
        CartLine::new("p1", "Linen Shirt", Price::new(dec!(50), CurrencyCode::AED), 1)
            .with_variant(format!("p1-{size}"))
            .with_option("Size", size)
    }

    #[test]
    fn test_add_merges_identical_selection() {
        let mut cart = Cart::new(CurrencyCode::AED);
        cart.add_line(shirt("M")).unwrap();
        cart.add_line(shirt("M")).unwrap();
        cart.add_line(shirt("L")).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_rejects_other_currency() {
        let mut cart = Cart::new(CurrencyCode::AED);
        let line = CartLine::new("p2", "Mug", Price::new(dec!(10), CurrencyCode::USD), 1);
        assert_eq!(
            cart.add_line(line),
            Err(CartError::CurrencyMismatch {
                expected: CurrencyCode::AED,
                found: CurrencyCode::USD
            })
        );
    }

    #[test]
    fn test_update_remove_clear() {
        let mut cart = Cart::new(CurrencyCode::AED);
        cart.add_line(shirt("M")).unwrap();
        cart.add_line(shirt("L")).unwrap();

        cart.update_quantity(1, 4).unwrap();
        assert_eq!(cart.lines()[1].quantity, 4);
        assert_eq!(cart.update_quantity(0, 0), Err(CartError::InvalidQuantity(0)));
        assert_eq!(cart.update_quantity(7, 1), Err(CartError::LineNotFound(7)));

        let removed = cart.remove_line(0).unwrap();
        assert_eq!(removed.options_label(), "M");
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_stock_key_prefers_variant() {
        assert_eq!(shirt("M").stock_key(), StockKey::Variant("p1-M".to_string()));
        let plain = CartLine::new("p9", "Card", Price::new(dec!(5), CurrencyCode::AED), 1);
        assert_eq!(plain.stock_key(), StockKey::Product("p9".to_string()));
    }
}
