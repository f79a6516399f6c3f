/// Custom actions for stock records.
#[derive(Debug, Clone)]
pub enum InventoryAction {
    /// Returns the current stock level without modifying it.
    CheckStock,
    /// Removes up to `n` units, clamping at zero. Never fails for lack of stock.
    Decrement(u32),
    /// Removes exactly `n` units.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if fewer than `n` units remain.
    Reserve(u32),
    /// Puts `n` units back (rolled-back submission or cancelled order).
    Restock(u32),
}

/// Results from InventoryActions.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryActionResult {
    StockLevel(u32),
    Adjusted { before: u32, after: u32 },
}
