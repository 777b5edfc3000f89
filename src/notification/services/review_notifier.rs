//! Adapter of the task context's review-notifier port.
//!
//! An audit decision becomes two artefacts: an inbox record the UI lists,
//! and a push fan-out across the completer's endpoints.

use crate::notification::{
    domain::{NotificationId, NotificationKind, NotificationRecord},
    ports::{NotificationInbox, PushSubscriptionRepository, PushTransport},
    services::{PushDispatcher, ReviewMessages},
};
use crate::task::{
    domain::ReviewDecision,
    ports::{ReviewNotice, ReviewNotifier, ReviewNotifyError},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

/// Review notifier backed by the inbox and the push dispatcher.
#[derive(Clone)]
pub struct AuditReviewNotifier<S, T, I, C>
where
    S: PushSubscriptionRepository + 'static,
    T: PushTransport + 'static,
    I: NotificationInbox,
    C: Clock + Send + Sync,
{
    dispatcher: PushDispatcher<S, T, C>,
    inbox: Arc<I>,
    messages: ReviewMessages,
    clock: Arc<C>,
}

impl<S, T, I, C> AuditReviewNotifier<S, T, I, C>
where
    S: PushSubscriptionRepository + 'static,
    T: PushTransport + 'static,
    I: NotificationInbox,
    C: Clock + Send + Sync,
{
    /// Creates a review notifier.
    #[must_use]
    pub const fn new(dispatcher: PushDispatcher<S, T, C>, inbox: Arc<I>, clock: Arc<C>) -> Self {
        Self {
            dispatcher,
            inbox,
            messages: ReviewMessages::new(),
            clock,
        }
    }
}

#[async_trait]
impl<S, T, I, C> ReviewNotifier for AuditReviewNotifier<S, T, I, C>
where
    S: PushSubscriptionRepository + 'static,
    T: PushTransport + 'static,
    I: NotificationInbox,
    C: Clock + Send + Sync,
{
    async fn notify(&self, notice: ReviewNotice) -> Result<(), ReviewNotifyError> {
        let message = self
            .messages
            .render(&notice)
            .map_err(ReviewNotifyError::new)?;

        let record = NotificationRecord {
            id: NotificationId::new(),
            user: notice.recipient,
            kind: match notice.decision {
                ReviewDecision::Approved => NotificationKind::AuditApproved,
                ReviewDecision::Rejected => NotificationKind::AuditRejected,
            },
            title: message.title.clone(),
            task_id: Some(notice.task_id),
            read: false,
            created_at: self.clock.utc(),
        };
        self.inbox
            .append(record)
            .await
            .map_err(ReviewNotifyError::new)?;

        // Per-endpoint failures live inside the report and are not errors;
        // only an unreadable subscription store fails the notification.
        self.dispatcher
            .dispatch(notice.recipient, message)
            .await
            .map_err(ReviewNotifyError::new)?;
        Ok(())
    }
}
