//! Coupon records: validation rules and the atomic usage counter.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
