//! Stock records and the per-line stock adjustments made at checkout.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
