//! Persistence contract for push subscriptions.

use crate::access::UserId;
use crate::notification::domain::{PushSubscription, SubscriptionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Push-subscription persistence contract.
#[async_trait]
pub trait PushSubscriptionRepository: Send + Sync {
    /// Returns every subscription registered for `user`.
    async fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<PushSubscription>, SubscriptionStoreError>;

    /// Stamps a subscription's last successful delivery instant.
    ///
    /// Stamping an already-removed subscription is a no-op, not an error: a
    /// concurrent prune may win the race.
    async fn mark_used(
        &self,
        id: SubscriptionId,
        at: DateTime<Utc>,
    ) -> Result<(), SubscriptionStoreError>;

    /// Deletes a subscription whose endpoint the channel reported gone.
    ///
    /// Removing an already-removed subscription is a no-op.
    async fn remove(&self, id: SubscriptionId) -> Result<(), SubscriptionStoreError>;
}

/// Errors returned by subscription store implementations.
#[derive(Debug, Clone, Error)]
pub enum SubscriptionStoreError {
    /// Persistence-layer failure.
    #[error("subscription store error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SubscriptionStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
