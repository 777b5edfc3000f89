//! Repository port for task-instance persistence and conditional updates.
//!
//! The write operations on this port are specified as atomic units: the
//! in-memory adapter holds its write lock for the whole operation, the
//! PostgreSQL adapter wraps each in a transaction with the state check
//! expressed in the `UPDATE`'s own predicate. Callers never read-then-write
//! across operation boundaries.

use crate::access::{TenantId, UserId};
use crate::task::domain::{
    AssignmentId, AuditStatus, GpsResult, InventoryLine, Pdv, RoutineRules, TaskDomainError,
    TaskInstance, TaskInstanceId, TaskState,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// A task instance joined with the read-only context its completion needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionContext {
    /// The task being completed.
    pub task: TaskInstance,
    /// Rules snapshot from the originating routine template.
    pub routine: RoutineRules,
    /// Location and acceptance radius of the point of sale.
    pub pdv: Pdv,
}

/// Candidate lifecycle transition computed by the completion service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionTransition {
    /// Completed state the deadline evaluation selected.
    pub state: TaskState,
    /// Completion instant to stamp.
    pub at: DateTime<Utc>,
    /// Completing user to stamp.
    pub by: UserId,
}

/// One completion submission, applied as a single atomic unit.
///
/// The `transition` is conditional: adapters apply it only while the row is
/// still open (`pending`/`in_progress`), so a concurrent second completion is
/// a no-op on state and stamp but still applies the field values. The audit
/// reopen rule (`rejected → unreviewed`) and the wholesale inventory replace
/// are part of the same unit; partial failure leaves the task unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionWrite {
    /// Conditional lifecycle transition; `None` when the task was already
    /// completed at load time.
    pub transition: Option<CompletionTransition>,
    /// GPS capture to persist, when coordinates were submitted.
    pub gps: Option<GpsResult>,
    /// Submission comment, when supplied.
    pub comment: Option<String>,
    /// Wholesale inventory replacement; `None` leaves existing rows alone.
    pub inventory: Option<Vec<InventoryLine>>,
    /// Submission instant, stamped as the row's update time.
    pub submitted_at: DateTime<Utc>,
}

/// Result of applying a [`CompletionWrite`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionApplied {
    /// The task as persisted after the write.
    pub task: TaskInstance,
    /// Whether the conditional transition was applied. `false` means another
    /// completion won the race or the task was already completed.
    pub transitioned: bool,
}

/// One audit decision write.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewWrite {
    /// Decided audit status (`approved` or `rejected`).
    pub status: AuditStatus,
    /// Reviewer identity to stamp.
    pub reviewer: UserId,
    /// Reviewer note.
    pub note: Option<String>,
    /// Decision instant.
    pub at: DateTime<Utc>,
}

/// Tenant scope of a missed-task sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepScope {
    /// Sweep a single tenant's tasks.
    Tenant(TenantId),
    /// Sweep across every tenant; reserved for the system credential.
    AllTenants,
}

/// Task persistence contract.
#[async_trait]
pub trait TaskInstanceRepository: Send + Sync {
    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskInstanceId) -> TaskStoreResult<Option<TaskInstance>>;

    /// Loads a task joined with its routine rules and point-of-sale location.
    ///
    /// Returns `None` when the task does not exist.
    async fn load_with_context(
        &self,
        id: TaskInstanceId,
    ) -> TaskStoreResult<Option<CompletionContext>>;

    /// Applies a completion submission as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::Persistence`] when the unit cannot be committed; no
    /// partial state is left behind in either case.
    async fn apply_completion(
        &self,
        id: TaskInstanceId,
        write: CompletionWrite,
    ) -> TaskStoreResult<CompletionApplied>;

    /// Records an audit decision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::Domain`] when the task is not in a completed state.
    async fn apply_review(
        &self,
        id: TaskInstanceId,
        write: ReviewWrite,
    ) -> TaskStoreResult<TaskInstance>;

    /// Cancels a task, guarded by the lifecycle state machine.
    ///
    /// The guard is evaluated inside the same atomic unit as the update, so a
    /// completion racing with a cancellation can never be overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::Domain`] when the task is completed or otherwise not
    /// cancellable.
    async fn apply_cancellation(
        &self,
        id: TaskInstanceId,
        by: UserId,
        reason: String,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<TaskInstance>;

    /// Deactivates a recurring assignment, appending `reason` to its notes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::AssignmentNotFound`] when the assignment
    /// does not exist.
    async fn deactivate_assignment(
        &self,
        id: AssignmentId,
        reason: &str,
    ) -> TaskStoreResult<()>;

    /// Transitions every task still `pending` with a scheduled date at or
    /// before `cutoff` to `missed`, as one set-based statement.
    ///
    /// Returns the number of affected rows. Running the sweep twice for the
    /// same cutoff affects zero rows the second time: already-swept tasks no
    /// longer match the `pending` predicate.
    async fn sweep_missed(
        &self,
        cutoff: NaiveDate,
        scope: SweepScope,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<u64>;

    /// Returns the inventory rows currently persisted for a task.
    async fn inventory_for(&self, id: TaskInstanceId) -> TaskStoreResult<Vec<InventoryLine>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskInstanceId),

    /// The recurring assignment was not found.
    #[error("recurring assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// A domain guard evaluated inside the store's atomic unit rejected the
    /// write.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
