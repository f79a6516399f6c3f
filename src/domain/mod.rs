//! Business records, kept free of actor plumbing.

pub mod cart;
pub mod coupon;
pub mod inventory;
pub mod money;
pub mod notification;
pub mod order;
pub mod status;

pub use cart::*;
pub use coupon::*;
pub use inventory::*;
pub use money::*;
pub use notification::*;
pub use order::*;
pub use status::*;
