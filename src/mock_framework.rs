//! # Mock Framework
//!
//! Utilities for testing clients and the checkout coordinator without a running actor.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_action`] to assert each
//! request and script the store's answer, including failures.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::actor_framework::{ChangeEvent, Entity, Filter, FrameworkError, ResourceClient, ResourceRequest};

pub type Responder<R, T> = oneshot::Sender<Result<R, FrameworkError<<T as Entity>::Error>>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends to a channel the test controls, so the test plays the actor:
/// it inspects each request and answers it (success, failure, or never).
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (client, receiver, _) = create_mock_client_with_feed(buffer_size);
    (client, receiver)
}

/// Like [`create_mock_client`], also returning the change-feed sender so the
/// test can publish events to subscribers.
pub fn create_mock_client_with_feed<T: Entity>(
    buffer_size: usize,
) -> (
    ResourceClient<T>,
    mpsc::Receiver<ResourceRequest<T>>,
    broadcast::Sender<ChangeEvent<T>>,
) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (changes, _) = broadcast::channel(buffer_size.max(1));
    (ResourceClient::new(sender, changes.clone()), receiver, changes)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Responder<T::Id, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Responder<Option<T>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Query request.
/// The test decides when to answer, which lets it interleave feed events.
pub async fn expect_query<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Filter<T>, Responder<Vec<T>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Query { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Answers the next Query request: the filter is applied to `candidates` and
/// the matches are sent back.
pub async fn answer_query<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>, candidates: Vec<T>) -> bool {
    match expect_query(receiver).await {
        Some((filter, respond_to)) => {
            let matches = candidates.into_iter().filter(|item| filter(item)).collect();
            respond_to.send(Ok(matches)).is_ok()
        }
        None => false,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Responder<T::ActionResult, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon_actor::CouponError;
    use crate::domain::{Coupon, CouponCreate, DiscountKind};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Coupon>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(CouponCreate::new("save10", DiscountKind::Percentage, dec!(10)))
                .await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.code, "save10");
        responder.send(Ok("SAVE10".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("SAVE10".to_string()));
    }

    #[tokio::test]
    async fn test_scripted_failure_reaches_caller() {
        let (client, mut receiver) = create_mock_client::<Coupon>(10);
        let get_task = tokio::spawn(async move { client.get("NOPE".to_string()).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, "NOPE");
        responder
            .send(Err(FrameworkError::Entity(CouponError::InvalidCode("NOPE".into()))))
            .unwrap();

        assert_eq!(
            get_task.await.unwrap(),
            Err(FrameworkError::Entity(CouponError::InvalidCode("NOPE".into())))
        );
    }
}
