use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    OrderCreated,
    StatusChanged,
}

/// Session-scoped message shown to the customer. Not durable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub order_number: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
