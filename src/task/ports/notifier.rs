//! Outbound notification contract consumed by the review service.
//!
//! The review service tells the notifier *what happened*; how that becomes an
//! inbox record and a push fan-out is the notification context's concern.

use crate::access::UserId;
use crate::task::domain::{ReviewDecision, TaskInstanceId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Everything a field user needs to know about a review decision on their
/// submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewNotice {
    /// The user who completed the task.
    pub recipient: UserId,
    /// The reviewed task.
    pub task_id: TaskInstanceId,
    /// Routine name, embedded in the message so the user knows which task.
    pub routine_name: String,
    /// The decision taken.
    pub decision: ReviewDecision,
    /// Reviewer note; rejections embed it so the user knows what to fix.
    pub note: Option<String>,
}

/// Contract for delivering a review decision to its field user.
#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    /// Records and delivers the notice.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewNotifyError`] when neither the inbox record nor the
    /// push fan-out could be produced. Callers treat this as best-effort: a
    /// failed notification never rolls back the audit decision.
    async fn notify(&self, notice: ReviewNotice) -> Result<(), ReviewNotifyError>;
}

/// Opaque failure from the notification pipeline.
#[derive(Debug, Clone, Error)]
#[error("review notification failed: {0}")]
pub struct ReviewNotifyError(pub Arc<dyn std::error::Error + Send + Sync>);

impl ReviewNotifyError {
    /// Wraps a notification pipeline error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
