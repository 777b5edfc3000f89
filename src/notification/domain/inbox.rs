//! Internal inbox records consumed by the out-of-scope UI.

use crate::access::UserId;
use crate::task::domain::TaskInstanceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an inbox record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification identifier from an existing UUID.
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

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of an inbox record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A reviewer approved the user's submission.
    AuditApproved,
    /// A reviewer rejected the user's submission.
    AuditRejected,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuditApproved => "audit_approved",
            Self::AuditRejected => "audit_rejected",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "audit_approved" => Ok(Self::AuditApproved),
            "audit_rejected" => Ok(Self::AuditRejected),
            _ => Err(ParseNotificationKindError(value.to_owned())),
        }
    }
}

/// Error returned while parsing notification kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);

/// One unread-until-opened inbox record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Record identifier.
    pub id: NotificationId,
    /// Recipient user.
    pub user: UserId,
    /// Record category.
    pub kind: NotificationKind,
    /// Rendered title shown in the inbox list.
    pub title: String,
    /// Task the record refers to, if any.
    pub task_id: Option<TaskInstanceId>,
    /// Whether the user has opened the record.
    pub read: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}
