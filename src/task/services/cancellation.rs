//! Administrative cancellation of task instances.

use crate::access::AuthContext;
use crate::task::{
    domain::{TaskDomainError, TaskInstance, TaskInstanceId},
    ports::{
        AuditAction, AuditLogEntry, AuditLogRecorder, TaskInstanceRepository, TaskStoreError,
    },
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Reach of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelScope {
    /// Cancel only this occurrence.
    Today,
    /// Cancel this occurrence and deactivate the recurring assignment that
    /// generates future ones.
    Future,
}

/// Service-level errors for task cancellation.
#[derive(Debug, Clone, Error)]
pub enum CancellationError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskInstanceId),

    /// The task belongs to a tenant the caller may not act on.
    #[error("task {0} belongs to another tenant")]
    TenantMismatch(TaskInstanceId),

    /// The caller's role may not cancel tasks.
    #[error("role may not cancel tasks")]
    PermissionDenied,

    /// A domain rule rejected the cancellation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The store could not record the cancellation.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for CancellationError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::NotFound(id),
            TaskStoreError::Domain(domain) => Self::Domain(domain),
            other => Self::Store(other),
        }
    }
}

/// What happened to the recurring assignment behind a cancelled task.
///
/// Deactivation is best-effort: its failure never fails the cancellation
/// itself, but callers are told distinctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// The request scope did not ask for deactivation.
    NotRequested,
    /// The task has no originating recurring assignment.
    NotLinked,
    /// The assignment was deactivated.
    Deactivated,
    /// Deactivation failed; the cancellation itself stands.
    Failed(String),
}

/// Result of a recorded cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct CancellationOutcome {
    /// The task as persisted after the cancellation.
    pub task: TaskInstance,
    /// Best-effort assignment deactivation result.
    pub assignment: AssignmentOutcome,
    /// Error message when the audit-log append failed; the cancellation
    /// itself stands.
    pub audit_log_error: Option<String>,
}

/// Cancellation orchestration service.
#[derive(Clone)]
pub struct CancellationService<R, A, C>
where
    R: TaskInstanceRepository,
    A: AuditLogRecorder,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    audit_log: Arc<A>,
    clock: Arc<C>,
}

impl<R, A, C> CancellationService<R, A, C>
where
    R: TaskInstanceRepository,
    A: AuditLogRecorder,
    C: Clock + Send + Sync,
{
    /// Creates a cancellation service.
    #[must_use]
    pub const fn new(repository: Arc<R>, audit_log: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            audit_log,
            clock,
        }
    }

    /// Cancels a task, optionally deactivating its recurring assignment.
    ///
    /// # Errors
    ///
    /// Returns [`CancellationError::PermissionDenied`] for non-elevated
    /// roles, [`CancellationError::NotFound`] for unknown tasks,
    /// [`CancellationError::TenantMismatch`] for cross-tenant access, and
    /// [`CancellationError::Domain`] when the task is completed or otherwise
    /// not cancellable. Assignment deactivation and audit logging are
    /// best-effort and surface in the outcome.
    pub async fn cancel(
        &self,
        task_id: TaskInstanceId,
        actor: &AuthContext,
        reason: &str,
        scope: CancelScope,
    ) -> Result<CancellationOutcome, CancellationError> {
        if !actor.role().may_cancel_tasks() {
            return Err(CancellationError::PermissionDenied);
        }
        let trimmed_reason = reason.trim();
        if trimmed_reason.is_empty() {
            return Err(TaskDomainError::EmptyCancellationReason.into());
        }

        let current = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(CancellationError::NotFound(task_id))?;
        if !actor.may_access_tenant(current.tenant()) {
            return Err(CancellationError::TenantMismatch(task_id));
        }

        // The store re-evaluates the lifecycle guard inside the same atomic
        // unit as the update, so a completion racing this call wins cleanly.
        let task = self
            .repository
            .apply_cancellation(task_id, actor.user(), trimmed_reason.to_owned(), self.clock.utc())
            .await?;

        let assignment = self.deactivate_assignment(&task, trimmed_reason, scope).await;
        let audit_log_error = self
            .append_audit_entry(&task, actor, trimmed_reason)
            .await
            .err()
            .map(|err| err.to_string());

        Ok(CancellationOutcome {
            task,
            assignment,
            audit_log_error,
        })
    }

    async fn deactivate_assignment(
        &self,
        task: &TaskInstance,
        reason: &str,
        scope: CancelScope,
    ) -> AssignmentOutcome {
        if scope != CancelScope::Future {
            return AssignmentOutcome::NotRequested;
        }
        let Some(assignment_id) = task.assignment_id() else {
            return AssignmentOutcome::NotLinked;
        };
        match self
            .repository
            .deactivate_assignment(assignment_id, reason)
            .await
        {
            Ok(()) => AssignmentOutcome::Deactivated,
            Err(err) => AssignmentOutcome::Failed(err.to_string()),
        }
    }

    async fn append_audit_entry(
        &self,
        task: &TaskInstance,
        actor: &AuthContext,
        reason: &str,
    ) -> Result<(), crate::task::ports::AuditLogError> {
        let cancelled_at = task.cancellation().map(|cancellation| cancellation.at);
        let entry = AuditLogEntry {
            actor: actor.user(),
            action: AuditAction::TaskCancelled,
            table_name: "task_instances".to_owned(),
            record_id: task.id().into_inner(),
            new_values: json!({
                "state": task.state().as_str(),
                "cancelled_by": actor.user(),
                "cancelled_at": cancelled_at,
                "reason": reason,
            }),
            at: self.clock.utc(),
        };
        self.audit_log.append(entry).await
    }
}
