//! Order records: creation from a checkout snapshot, validated status
//! transitions and the append-only note thread.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
