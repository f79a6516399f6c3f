//! Generic resource actor.
//!
//! Each stored collection (coupons, stock records, orders) is owned by exactly one
//! [`ResourceActor`] task. Every request against the collection goes through the
//! actor's mailbox, so read-modify-write actions such as "increment the coupon
//! usage counter unless it hit the cap" run without interleaving.
//!
//! Successful mutations are published on a broadcast channel as [`ChangeEvent`]s,
//! in the order the actor applied them. That feed is the row-level subscription
//! the realtime order sync listens to.

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Capacity of the per-collection change feed.
pub const CHANGE_FEED_CAPACITY: usize = 256;

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any stored record must implement to be managed by [`ResourceActor`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;
    type CreateParams: Send + Sync + Debug + 'static;
    type Patch: Send + Sync + Debug + 'static;
    type Action: Send + Sync + Debug + 'static;
    type ActionResult: Send + Sync + Debug + 'static;
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Construct the full record from the derived id and the creation parameters.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Domain-specific mutation. Runs inside the actor loop, so it is atomic
    /// with respect to every other request on the same collection.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Errors produced by the actor plumbing, wrapping the entity's own error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped the response")]
    ActorDropped,
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Entity(E),
}

/// A committed change to one record, as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<T> {
    Inserted(T),
    Updated { before: T, after: T },
    Deleted(T),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

/// Predicate used by [`ResourceRequest::Query`].
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    Query {
        filter: Filter<T>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
}

impl<T: Entity> Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { params, .. } => f.debug_struct("Create").field("params", params).finish(),
            Self::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            Self::Query { .. } => f.write_str("Query"),
            Self::Update { id, patch, .. } => f
                .debug_struct("Update")
                .field("id", id)
                .field("patch", patch)
                .finish(),
            Self::Delete { id, .. } => f.debug_struct("Delete").field("id", id).finish(),
            Self::Action { id, action, .. } => f
                .debug_struct("Action")
                .field("id", id)
                .field("action", action)
                .finish(),
        }
    }
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

type IdFn<T> = Box<dyn Fn(&<T as Entity>::CreateParams) -> <T as Entity>::Id + Send + Sync>;

pub struct ResourceActor<T: Entity> {
    name: &'static str,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    id_for: IdFn<T>,
    changes: broadcast::Sender<ChangeEvent<T>>,
}

impl<T: Entity> ResourceActor<T> {
    /// Builds the actor and its client. `id_for` derives the record id from the
    /// creation parameters; a duplicate id is rejected with `AlreadyExists`.
    pub fn new(
        name: &'static str,
        buffer_size: usize,
        id_for: impl Fn(&T::CreateParams) -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        let actor = Self {
            name,
            receiver,
            store: HashMap::new(),
            id_for: Box::new(id_for),
            changes: changes.clone(),
        };
        (actor, ResourceClient::new(sender, changes))
    }

    #[instrument(name = "resource_actor", skip(self), fields(collection = self.name))]
    pub async fn run(mut self) {
        info!("Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::Query { filter, respond_to } => {
                    let items = self.store.values().filter(|item| filter(item)).cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
            }
        }
        info!("Actor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        let id = (self.id_for)(&params);
        if self.store.contains_key(&id) {
            warn!(id = %id, "Rejecting duplicate id");
            return Err(FrameworkError::AlreadyExists(id.to_string()));
        }
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;
        self.store.insert(id.clone(), item.clone());
        debug!(id = %id, "Record created");
        self.publish(ChangeEvent::Inserted(item));
        Ok(id)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let before = item.clone();
        if let Err(e) = item.on_update(patch) {
            *item = before;
            return Err(FrameworkError::Entity(e));
        }
        let after = item.clone();
        self.publish(ChangeEvent::Updated { before, after: after.clone() });
        Ok(after)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete().map_err(FrameworkError::Entity)?;
        if let Some(removed) = self.store.remove(&id) {
            self.publish(ChangeEvent::Deleted(removed));
        }
        Ok(())
    }

    fn handle_action(
        &mut self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        // Actions mutate in place; a failed action must leave the record untouched.
        let before = item.clone();
        match item.handle_action(action) {
            Ok(result) => {
                let after = item.clone();
                debug!(id = %item.id(), "Action applied");
                self.publish(ChangeEvent::Updated { before, after });
                Ok(result)
            }
            Err(e) => {
                *item = before;
                Err(FrameworkError::Entity(e))
            }
        }
    }

    fn publish(&self, event: ChangeEvent<T>) {
        // No subscribers is the normal case outside an open customer session.
        let _ = self.changes.send(event);
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    changes: broadcast::Sender<ChangeEvent<T>>,
    timeout: Option<Duration>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>, changes: broadcast::Sender<ChangeEvent<T>>) -> Self {
        Self {
            sender,
            changes,
            timeout: None,
        }
    }

    /// Bounds every request made through this client. Expiry yields `Timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Subscribes to committed changes. Events arrive in the order they were applied.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent<T>> {
        self.changes.subscribe()
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn query(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, FrameworkError<T::Error>> {
        let filter: Filter<T> = Box::new(filter);
        self.request(|respond_to| ResourceRequest::Query { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(build(respond_to))
                .await
                .map_err(|_| FrameworkError::ActorClosed)?;
            response.await.map_err(|_| FrameworkError::ActorDropped)?
        };
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| FrameworkError::Timeout(limit))?,
            None => exchange.await,
        }
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: String,
        value: u32,
        ceiling: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        ceiling: u32,
    }

    #[derive(Debug)]
    enum CounterAction {
        Bump,
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    enum CounterError {
        #[error("ceiling reached")]
        Ceiling,
    }

    impl Entity for Counter {
        type Id = String;
        type CreateParams = CounterCreate;
        type Patch = u32;
        type Action = CounterAction;
        type ActionResult = u32;
        type Error = CounterError;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: CounterCreate) -> Result<Self, CounterError> {
            Ok(Self {
                id,
                value: 0,
                ceiling: params.ceiling,
            })
        }

        fn on_update(&mut self, patch: u32) -> Result<(), CounterError> {
            self.value = patch;
            Ok(())
        }

        fn handle_action(&mut self, action: CounterAction) -> Result<u32, CounterError> {
            match action {
                CounterAction::Bump => {
                    // Mutate first, then fail: the actor must roll this back.
                    self.value += 1;
                    if self.value > self.ceiling {
                        return Err(CounterError::Ceiling);
                    }
                    Ok(self.value)
                }
            }
        }
    }

    fn spawn_counters() -> ResourceClient<Counter> {
        let counter = Arc::new(AtomicU64::new(1));
        let (actor, client) = ResourceActor::<Counter>::new("counters", 16, move |_| {
            format!("counter_{}", counter.fetch_add(1, Ordering::SeqCst))
        });
        tokio::spawn(actor.run());
        client
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_failed_action_leaves_record_untouched() {
        let client = spawn_counters();
        let id = client.create(CounterCreate { ceiling: 1 }).await.unwrap();

        assert_eq!(client.perform_action(id.clone(), CounterAction::Bump).await.unwrap(), 1);
        let err = client.perform_action(id.clone(), CounterAction::Bump).await.unwrap_err();
        assert_eq!(err, FrameworkError::Entity(CounterError::Ceiling));

        let counter = client.get(id).await.unwrap().unwrap();
        assert_eq!(counter.value, 1);
    }

    #[tokio::test]
    async fn test_concurrent_actions_respect_ceiling() {
        let client = spawn_counters();
        let id = client.create(CounterCreate { ceiling: 5 }).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let client = client.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                client.perform_action(id, CounterAction::Bump).await
            }));
        }
        let mut succeeded = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 5);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let (actor, client) = ResourceActor::<Counter>::new("fixed", 4, |_| "same".to_string());
        tokio::spawn(actor.run());

        client.create(CounterCreate { ceiling: 1 }).await.unwrap();
        let err = client.create(CounterCreate { ceiling: 1 }).await.unwrap_err();
        assert_eq!(err, FrameworkError::AlreadyExists("same".to_string()));
    }

    #[tokio::test]
    async fn test_change_feed_order() {
        let client = spawn_counters();
        let mut feed = client.subscribe();

        let id = client.create(CounterCreate { ceiling: 3 }).await.unwrap();
        client.perform_action(id.clone(), CounterAction::Bump).await.unwrap();
        client.update(id.clone(), 3).await.unwrap();
        client.delete(id.clone()).await.unwrap();

        assert!(matches!(feed.recv().await.unwrap(), ChangeEvent::Inserted(c) if c.value == 0));
        assert!(matches!(
            feed.recv().await.unwrap(),
            ChangeEvent::Updated { before, after } if before.value == 0 && after.value == 1
        ));
        assert!(matches!(feed.recv().await.unwrap(), ChangeEvent::Updated { after, .. } if after.value == 3));
        assert!(matches!(feed.recv().await.unwrap(), ChangeEvent::Deleted(c) if c.id == id));
    }

    #[tokio::test]
    async fn test_query_filters_records() {
        let client = spawn_counters();
        client.create(CounterCreate { ceiling: 1 }).await.unwrap();
        client.create(CounterCreate { ceiling: 9 }).await.unwrap();

        let high = client.query(|c: &Counter| c.ceiling > 5).await.unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].ceiling, 9);
    }

    #[tokio::test]
    async fn test_timeout_when_actor_never_answers() {
        let (sender, _receiver) = mpsc::channel::<ResourceRequest<Counter>>(4);
        let (changes, _) = broadcast::channel(4);
        let client = ResourceClient::new(sender, changes).with_timeout(Duration::from_millis(20));

        let err = client.get("missing".to_string()).await.unwrap_err();
        assert_eq!(err, FrameworkError::Timeout(Duration::from_millis(20)));
    }
}
