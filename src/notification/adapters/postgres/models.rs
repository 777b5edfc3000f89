//! Diesel row models and domain conversions for notification persistence.

use super::schema::{notifications, push_subscriptions};
use crate::access::UserId;
use crate::notification::domain::{NotificationRecord, PushSubscription, SubscriptionId};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for push subscriptions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = push_subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriptionRow {
    /// Subscription identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Delivery endpoint URL.
    pub endpoint: String,
    /// Client public key.
    pub p256dh: String,
    /// Client authentication secret.
    pub auth: String,
    /// Last successful delivery instant.
    pub last_used_at: Option<DateTime<Utc>>,
}

impl SubscriptionRow {
    /// Converts the row into the domain type.
    #[must_use]
    pub fn into_domain(self) -> PushSubscription {
        PushSubscription {
            id: SubscriptionId::from_uuid(self.id),
            user: UserId::from_uuid(self.user_id),
            endpoint: self.endpoint,
            p256dh: self.p256dh,
            auth: self.auth,
            last_used_at: self.last_used_at,
        }
    }
}

/// Insert model for inbox records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Recipient user.
    pub user_id: uuid::Uuid,
    /// Record category.
    pub kind: String,
    /// Rendered title.
    pub title: String,
    /// Task the record refers to, if any.
    pub task_id: Option<uuid::Uuid>,
    /// Read flag.
    pub read: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl NewNotificationRow {
    /// Builds an insert row from a domain record.
    #[must_use]
    pub fn from_record(record: NotificationRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            user_id: record.user.into_inner(),
            kind: record.kind.as_str().to_owned(),
            title: record.title,
            task_id: record.task_id.map(crate::task::domain::TaskInstanceId::into_inner),
            read: record.read,
            created_at: record.created_at,
        }
    }
}
