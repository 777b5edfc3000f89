//! Push message payload and delivery parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time-to-live for every push delivery. Stale task notifications are
/// worthless, so undeliverable messages expire quickly.
pub const DELIVERY_TTL: Duration = Duration::from_secs(60);

/// Urgency hint handed to the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Deliver opportunistically.
    Normal,
    /// Deliver immediately, waking the device if needed.
    High,
}

impl Urgency {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// User-visible message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Deep link opened when the user taps the notification.
    pub url: Option<String>,
}

/// One delivery attempt: payload plus channel parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDelivery {
    /// Message content.
    pub message: PushMessage,
    /// Time-to-live for the delivery.
    pub ttl: Duration,
    /// Urgency hint.
    pub urgency: Urgency,
}

impl PushDelivery {
    /// Wraps a message with the platform delivery parameters.
    #[must_use]
    pub const fn for_message(message: PushMessage) -> Self {
        Self {
            message,
            ttl: DELIVERY_TTL,
            urgency: Urgency::High,
        }
    }
}
