use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ChangeEvent;
use crate::clients::OrderClient;
use crate::domain::{Notification, Order};
use crate::order_actor::OrderError;

use super::feed::CustomerOrderFeed;

const COMMAND_BUFFER: usize = 16;

enum SyncCommand {
    Orders(oneshot::Sender<Vec<Order>>),
    Notifications(oneshot::Sender<Vec<Notification>>),
    UnreadCount(oneshot::Sender<usize>),
    MarkAllRead(oneshot::Sender<()>),
}

/// Entry point for a customer session's live order view.
pub struct RealtimeOrderSync;

impl RealtimeOrderSync {
    /// Loads the customer's current orders and starts applying changes.
    ///
    /// The feed is subscribed before the initial load so no change between the
    /// two is lost. Changes the load already reflects are dropped by version.
    #[instrument(skip(orders))]
    pub async fn subscribe(orders: &OrderClient, user_id: String) -> Result<SyncHandle, OrderError> {
        let changes = orders.subscribe();
        let initial = orders.orders_for_customer(user_id.clone()).await?;
        info!(orders = initial.len(), "Order sync started");

        let feed = CustomerOrderFeed::new(user_id, initial);
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(feed, changes, receiver));
        Ok(SyncHandle {
            commands,
            task: Some(task),
        })
    }
}

/// Handle to a running sync. Dropping it stops the sync.
pub struct SyncHandle {
    commands: mpsc::Sender<SyncCommand>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Currently visible orders. Empty once the sync has stopped.
    pub async fn orders(&self) -> Vec<Order> {
        self.ask(SyncCommand::Orders).await.unwrap_or_default()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.ask(SyncCommand::Notifications).await.unwrap_or_default()
    }

    pub async fn unread_count(&self) -> usize {
        self.ask(SyncCommand::UnreadCount).await.unwrap_or_default()
    }

    pub async fn mark_all_read(&self) {
        let _ = self.ask(SyncCommand::MarkAllRead).await;
    }

    /// Stops the sync and waits for its task to finish.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        debug!("Order sync unsubscribed");
    }

    async fn ask<R>(&self, build: impl FnOnce(oneshot::Sender<R>) -> SyncCommand) -> Option<R> {
        let (respond_to, response) = oneshot::channel();
        self.commands.send(build(respond_to)).await.ok()?;
        response.await.ok()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[instrument(name = "order_sync", skip_all, fields(user_id = %feed.user_id()))]
async fn run(
    mut feed: CustomerOrderFeed,
    mut changes: broadcast::Receiver<ChangeEvent<Order>>,
    mut commands: mpsc::Receiver<SyncCommand>,
) {
    loop {
        // Pending changes are applied before any read is answered.
        tokio::select! {
            biased;
            change = changes.recv() => match change {
                Ok(event) => {
                    if let Some(notification) = feed.apply(&event) {
                        info!(order_number = %notification.order_number, kind = ?notification.kind, "Notification raised");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Order sync lagged, {} changes skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Order feed closed");
                    break;
                }
            },
            command = commands.recv() => match command {
                Some(SyncCommand::Orders(respond_to)) => {
                    let _ = respond_to.send(feed.orders().to_vec());
                }
                Some(SyncCommand::Notifications(respond_to)) => {
                    let _ = respond_to.send(feed.notifications().all().to_vec());
                }
                Some(SyncCommand::UnreadCount(respond_to)) => {
                    let _ = respond_to.send(feed.notifications().unread_count());
                }
                Some(SyncCommand::MarkAllRead(respond_to)) => {
                    feed.notifications_mut().mark_all_read();
                    let _ = respond_to.send(());
                }
                None => break,
            },
        }
    }
    debug!("Order sync stopped");
}
