use tokio::sync::broadcast;
use tracing::{debug, instrument};

use crate::actor_framework::{ChangeEvent, ResourceClient};
use crate::domain::{Order, OrderCreate, OrderNote, OrderStatus};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

crate::impl_basic_client!(OrderClient, Order, String, OrderError, order);

impl OrderClient {
    /// Persists an order. Fails with `AlreadyExists` if the number is taken.
    #[instrument(skip(self, params), fields(order_number = %params.order_number))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<String, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(OrderError::from)
    }

    /// Looks up an order for tracking. When `email` is given it must match the
    /// one captured on the order; a mismatch reads as `NotFound`.
    #[instrument(skip(self, email))]
    pub async fn track(&self, order_number: String, email: Option<&str>) -> Result<Order, OrderError> {
        debug!("Sending request");
        let order = self
            .inner
            .get(order_number.clone())
            .await
            .map_err(OrderError::from)?
            .ok_or_else(|| OrderError::NotFound(order_number.clone()))?;
        match email {
            Some(email) if !order.matches_email(email) => Err(OrderError::NotFound(order_number)),
            _ => Ok(order),
        }
    }

    /// Orders owned by `user_id`, oldest first.
    #[instrument(skip(self))]
    pub async fn orders_for_customer(&self, user_id: String) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let mut orders = self
            .inner
            .query(move |order: &Order| order.belongs_to(&user_id))
            .await
            .map_err(OrderError::from)?;
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        Ok(orders)
    }

    /// Moves the order to `to`. Returns the `(from, to)` pair that was applied.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        order_number: String,
        to: OrderStatus,
    ) -> Result<(OrderStatus, OrderStatus), OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(order_number, OrderAction::Transition(to)).await {
            Ok(OrderActionResult::Transitioned { from, to }) => Ok((from, to)),
            Ok(_) => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, note), fields(author = ?note.author))]
    pub async fn append_note(&self, order_number: String, note: OrderNote) -> Result<usize, OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(order_number, OrderAction::AppendNote(note)).await {
            Ok(OrderActionResult::NoteAppended { thread_len }) => Ok(thread_len),
            Ok(_) => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Stores how many units were taken from inventory for each item.
    #[instrument(skip(self))]
    pub async fn record_stock_removed(&self, order_number: String, removed: Vec<u32>) -> Result<u32, OrderError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(order_number, OrderAction::RecordStockRemoved(removed))
            .await
        {
            Ok(OrderActionResult::StockRecorded { units }) => Ok(units),
            Ok(_) => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Row-level change feed for the orders collection.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<Order>> {
        self.inner.subscribe()
    }
}
