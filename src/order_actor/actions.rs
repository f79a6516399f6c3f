use crate::domain::{OrderNote, OrderStatus};

/// The only ways a persisted order may change.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order to a new lifecycle state.
    ///
    /// # Errors
    /// Fails with `InvalidTransition` unless the status machine allows the move.
    Transition(OrderStatus),
    /// Appends to the message thread. Existing entries are never edited.
    AppendNote(OrderNote),
    /// Records the units taken from inventory for each item, in item order.
    ///
    /// # Errors
    /// Fails with `ValidationError` if the counts do not line up with the items.
    RecordStockRemoved(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    Transitioned { from: OrderStatus, to: OrderStatus },
    NoteAppended { thread_len: usize },
    StockRecorded { units: u32 },
}
