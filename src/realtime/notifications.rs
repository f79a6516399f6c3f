use chrono::Utc;

use crate::domain::{Notification, NotificationKind};

/// In-session notification list. Lost when the session ends.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    next_id: u64,
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn push(&mut self, kind: NotificationKind, order_number: &str, message: String) -> Notification {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            kind,
            order_number: order_number.to_string(),
            message,
            read: false,
            created_at: Utc::now(),
        };
        self.items.push(notification.clone());
        notification
    }

    /// Oldest first.
    pub fn all(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for notification in &mut self.items {
            notification.read = true;
        }
    }
}
