//! Port contracts for push delivery and the internal inbox.

pub mod inbox;
pub mod subscriptions;
pub mod transport;

pub use inbox::{InboxError, NotificationInbox};
pub use subscriptions::{PushSubscriptionRepository, SubscriptionStoreError};
pub use transport::{PushTransport, PushTransportError};

#[cfg(test)]
pub(crate) use transport::MockPushTransport;
