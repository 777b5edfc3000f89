//! Registered push delivery endpoints.

use crate::access::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a push subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Creates a new random subscription identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a subscription identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered delivery endpoint for a user.
///
/// Created by out-of-scope client registration; deleted by the dispatcher
/// when the channel reports the endpoint as gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Subscription identifier.
    pub id: SubscriptionId,
    /// Owning user.
    pub user: UserId,
    /// Delivery endpoint URL.
    pub endpoint: String,
    /// Client public key (P-256 ECDH).
    pub p256dh: String,
    /// Client authentication secret.
    pub auth: String,
    /// Instant of the last successful delivery, if any.
    pub last_used_at: Option<DateTime<Utc>>,
}
