//! Audit review: approve or reject a completed task, then tell the field
//! user.

use crate::access::AuthContext;
use crate::task::{
    domain::{ReviewDecision, TaskDomainError, TaskInstance, TaskInstanceId},
    ports::{ReviewNotice, ReviewNotifier, ReviewWrite, TaskInstanceRepository, TaskStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for audit reviews.
#[derive(Debug, Clone, Error)]
pub enum ReviewError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskInstanceId),

    /// The task belongs to a tenant the caller may not act on.
    #[error("task {0} belongs to another tenant")]
    TenantMismatch(TaskInstanceId),

    /// The caller's role may not review tasks.
    #[error("role may not review tasks")]
    PermissionDenied,

    /// A domain rule rejected the review.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The store could not record the decision.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for ReviewError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::NotFound(id),
            TaskStoreError::Domain(domain) => Self::Domain(domain),
            other => Self::Store(other),
        }
    }
}

/// What happened to the field-user notification for a recorded decision.
///
/// Delivery is best-effort: the audit transition is the source of truth and
/// a failed notification never rolls it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The notice was recorded and handed to the push fan-out.
    Sent,
    /// The reviewer completed the task themselves; nothing to send.
    SkippedSelfReview,
    /// The notification pipeline failed; the decision stands.
    Failed(String),
}

/// Result of a recorded audit decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    /// The task as persisted after the decision.
    pub task: TaskInstance,
    /// Best-effort notification result.
    pub notification: NotificationOutcome,
}

/// Audit review orchestration service.
#[derive(Clone)]
pub struct ReviewService<R, N, C>
where
    R: TaskInstanceRepository,
    N: ReviewNotifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<R, N, C> ReviewService<R, N, C>
where
    R: TaskInstanceRepository,
    N: ReviewNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a review service.
    #[must_use]
    pub const fn new(repository: Arc<R>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// Records an audit decision over a completed task.
    ///
    /// Rejections require a note; its text is embedded in the notification so
    /// the field user knows exactly what to fix. When the completer differs
    /// from the reviewer, an inbox record and a push fan-out are produced
    /// through the notifier port.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::PermissionDenied`] for unauthorised roles,
    /// [`ReviewError::NotFound`] for unknown tasks,
    /// [`ReviewError::TenantMismatch`] for cross-tenant access, and
    /// [`ReviewError::Domain`] when the task is not completed or a rejection
    /// carries no note. Notification failures are reported in the outcome,
    /// never as an error.
    pub async fn review(
        &self,
        task_id: TaskInstanceId,
        actor: &AuthContext,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> Result<ReviewOutcome, ReviewError> {
        if !actor.role().may_review_tasks() {
            return Err(ReviewError::PermissionDenied);
        }

        let context = self
            .repository
            .load_with_context(task_id)
            .await?
            .ok_or(ReviewError::NotFound(task_id))?;

        if !actor.may_access_tenant(context.task.tenant()) {
            return Err(ReviewError::TenantMismatch(task_id));
        }
        if !context.task.state().is_completed() {
            return Err(TaskDomainError::NotCompleted(task_id).into());
        }

        let trimmed_note = note.map(|text| text.trim().to_owned()).filter(|text| !text.is_empty());
        if decision == ReviewDecision::Rejected && trimmed_note.is_none() {
            return Err(TaskDomainError::EmptyRejectionNote.into());
        }

        let write = ReviewWrite {
            status: decision.as_audit_status(),
            reviewer: actor.user(),
            note: trimmed_note.clone(),
            at: self.clock.utc(),
        };
        let task = self.repository.apply_review(task_id, write).await?;

        let notification = self
            .notify_completer(&task, &context.routine.name, actor, decision, trimmed_note)
            .await;

        Ok(ReviewOutcome { task, notification })
    }

    /// Delivers the decision to the completer, unless they reviewed their own
    /// work.
    async fn notify_completer(
        &self,
        task: &TaskInstance,
        routine_name: &str,
        actor: &AuthContext,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> NotificationOutcome {
        let Some(completer) = task.completed_by() else {
            return NotificationOutcome::SkippedSelfReview;
        };
        if completer == actor.user() {
            return NotificationOutcome::SkippedSelfReview;
        }

        let notice = ReviewNotice {
            recipient: completer,
            task_id: task.id(),
            routine_name: routine_name.to_owned(),
            decision,
            note,
        };
        match self.notifier.notify(notice).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(err) => NotificationOutcome::Failed(err.to_string()),
        }
    }
}
