//! Domain model for push delivery and the internal inbox.

mod inbox;
mod message;
mod outcome;
mod subscription;

pub use inbox::{NotificationId, NotificationKind, NotificationRecord, ParseNotificationKindError};
pub use message::{DELIVERY_TTL, PushDelivery, PushMessage, Urgency};
pub use outcome::{DispatchReport, EndpointOutcome};
pub use subscription::{PushSubscription, SubscriptionId};
