//! Concurrent push fan-out with dead-endpoint pruning.

use crate::access::UserId;
use crate::notification::{
    domain::{DispatchReport, EndpointOutcome, PushDelivery, PushMessage, PushSubscription},
    ports::{PushSubscriptionRepository, PushTransport, PushTransportError, SubscriptionStoreError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for the dispatcher.
///
/// Only the subscription listing can fail the call as a whole; per-endpoint
/// delivery failures are isolated into the report.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The subscription store could not be read.
    #[error(transparent)]
    Store(#[from] SubscriptionStoreError),
}

/// Push fan-out service.
///
/// Deliveries to a user's endpoints run concurrently and independently: one
/// endpoint's failure never aborts delivery to the others. An endpoint the
/// channel reports as gone is deleted on the spot, which is the system's only
/// cleanup policy against stale registrations.
#[derive(Clone)]
pub struct PushDispatcher<S, T, C>
where
    S: PushSubscriptionRepository + 'static,
    T: PushTransport + 'static,
    C: Clock + Send + Sync,
{
    subscriptions: Arc<S>,
    transport: Arc<T>,
    clock: Arc<C>,
}

impl<S, T, C> PushDispatcher<S, T, C>
where
    S: PushSubscriptionRepository + 'static,
    T: PushTransport + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(subscriptions: Arc<S>, transport: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            subscriptions,
            transport,
            clock,
        }
    }

    /// Delivers `message` to every endpoint registered for `user`.
    ///
    /// A user with zero endpoints yields the empty report, a successful
    /// no-op. The returned report carries one outcome per endpoint; callers
    /// must not treat partial failure as a whole-operation failure.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`] only when the subscription list
    /// cannot be read.
    pub async fn dispatch(
        &self,
        user: UserId,
        message: PushMessage,
    ) -> Result<DispatchReport, DispatchError> {
        let subscriptions = self.subscriptions.list_for_user(user).await?;
        if subscriptions.is_empty() {
            return Ok(DispatchReport::empty());
        }

        let delivery = Arc::new(PushDelivery::for_message(message));
        let now = self.clock.utc();

        let mut handles = Vec::with_capacity(subscriptions.len());
        for subscription in subscriptions {
            let endpoint = subscription.endpoint.clone();
            let task = tokio::spawn(deliver_to_endpoint(
                Arc::clone(&self.subscriptions),
                Arc::clone(&self.transport),
                Arc::clone(&delivery),
                subscription,
                now,
            ));
            handles.push((endpoint, task));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (endpoint, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => EndpointOutcome::Failed {
                    endpoint,
                    reason: format!("delivery task failed: {err}"),
                },
            };
            outcomes.push(outcome);
        }
        Ok(DispatchReport::new(outcomes))
    }
}

/// One endpoint's delivery attempt, isolated from its siblings.
async fn deliver_to_endpoint<S, T>(
    subscriptions: Arc<S>,
    transport: Arc<T>,
    delivery: Arc<PushDelivery>,
    subscription: PushSubscription,
    now: DateTime<Utc>,
) -> EndpointOutcome
where
    S: PushSubscriptionRepository,
    T: PushTransport,
{
    let endpoint = subscription.endpoint.clone();
    match transport.deliver(&subscription, &delivery).await {
        Ok(()) => {
            // The stamp is advisory; a failure to record it never demotes a
            // successful delivery.
            let _stamped = subscriptions.mark_used(subscription.id, now).await.is_ok();
            EndpointOutcome::Delivered { endpoint }
        }
        Err(PushTransportError::EndpointGone) => {
            match subscriptions.remove(subscription.id).await {
                Ok(()) => EndpointOutcome::Pruned { endpoint },
                Err(err) => EndpointOutcome::Failed {
                    endpoint,
                    reason: format!("endpoint gone but prune failed: {err}"),
                },
            }
        }
        Err(PushTransportError::Delivery(reason)) => {
            EndpointOutcome::Failed { endpoint, reason }
        }
    }
}
