//! Thread-safe in-memory subscription store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::access::UserId;
use crate::notification::{
    domain::{PushSubscription, SubscriptionId},
    ports::{PushSubscriptionRepository, SubscriptionStoreError},
};

/// Thread-safe in-memory subscription store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    state: Arc<RwLock<HashMap<SubscriptionId, PushSubscription>>>,
}

impl InMemorySubscriptionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a subscription.
    pub fn insert(&self, subscription: PushSubscription) {
        if let Ok(mut state) = self.state.write() {
            state.insert(subscription.id, subscription);
        }
    }

    /// Returns a subscription's current row, for test assertions.
    #[must_use]
    pub fn get(&self, id: SubscriptionId) -> Option<PushSubscription> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.get(&id).cloned())
    }

    /// Returns the number of stored subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.len()).unwrap_or(0)
    }

    /// Returns `true` when no subscriptions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_error(err: impl std::fmt::Display) -> SubscriptionStoreError {
        SubscriptionStoreError::persistence(std::io::Error::other(err.to_string()))
    }
}

#[async_trait]
impl PushSubscriptionRepository for InMemorySubscriptionStore {
    async fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<PushSubscription>, SubscriptionStoreError> {
        let state = self.state.read().map_err(Self::lock_error)?;
        Ok(state
            .values()
            .filter(|subscription| subscription.user == user)
            .cloned()
            .collect())
    }

    async fn mark_used(
        &self,
        id: SubscriptionId,
        at: DateTime<Utc>,
    ) -> Result<(), SubscriptionStoreError> {
        let mut state = self.state.write().map_err(Self::lock_error)?;
        if let Some(subscription) = state.get_mut(&id) {
            subscription.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn remove(&self, id: SubscriptionId) -> Result<(), SubscriptionStoreError> {
        let mut state = self.state.write().map_err(Self::lock_error)?;
        state.remove(&id);
        Ok(())
    }
}
