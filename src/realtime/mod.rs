//! Live view of one customer's orders, fed by the orders change feed.

mod feed;
mod notifications;
mod sync;

pub use feed::CustomerOrderFeed;
pub use notifications::NotificationCenter;
pub use sync::{RealtimeOrderSync, SyncHandle};
