//! Task-instance aggregate root and its lifecycle mutations.

use super::{
    AssignmentId, AuditStatus, GpsResult, ParsePriorityError, PdvId, RoutineId, TaskDomainError,
    TaskInstanceId, TaskState,
};
use crate::access::{TenantId, UserId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Priority snapshot copied from the routine when the instance was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low-priority routine.
    Low,
    /// Default priority.
    Medium,
    /// High-priority routine.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Cancellation metadata stamped when an administrator cancels a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Instant the cancellation was recorded.
    pub at: DateTime<Utc>,
    /// Administrator who cancelled the task.
    pub by: UserId,
    /// Caller-supplied cancellation reason.
    pub reason: String,
}

/// Review metadata stamped by the most recent audit decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Reviewer who issued the decision.
    pub reviewer: UserId,
    /// Instant the decision was recorded.
    pub at: DateTime<Utc>,
    /// Reviewer note; required context for rejections.
    pub note: Option<String>,
}

/// Task-instance aggregate root: one scheduled occurrence of a routine at a
/// point of sale on a date.
///
/// Instances are generated by the out-of-scope scheduler and mutated
/// exclusively through the lifecycle services. They are never physically
/// deleted; cancellation is a terminal state, not removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    id: TaskInstanceId,
    tenant: TenantId,
    routine_id: RoutineId,
    pdv_id: PdvId,
    assignment_id: Option<AssignmentId>,
    scheduled_date: NaiveDate,
    deadline_time: Option<NaiveTime>,
    state: TaskState,
    audit_status: AuditStatus,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<UserId>,
    gps: Option<GpsResult>,
    comment: Option<String>,
    priority: Priority,
    cancellation: Option<Cancellation>,
    review: Option<ReviewRecord>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTaskInstance {
    /// Persisted task identifier.
    pub id: TaskInstanceId,
    /// Owning tenant; never changes over the task's life.
    pub tenant: TenantId,
    /// Originating routine template.
    pub routine_id: RoutineId,
    /// Point of sale the task is executed at.
    pub pdv_id: PdvId,
    /// Originating recurring assignment, if any.
    pub assignment_id: Option<AssignmentId>,
    /// Calendar date the task is scheduled for.
    pub scheduled_date: NaiveDate,
    /// Deadline time-of-day snapshot; end of day when absent.
    pub deadline_time: Option<NaiveTime>,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted audit sub-state.
    pub audit_status: AuditStatus,
    /// Completion instant, populated on first completion only.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completer identity, populated on first completion only.
    pub completed_by: Option<UserId>,
    /// GPS capture persisted with a completion.
    pub gps: Option<GpsResult>,
    /// Free-text submission comment.
    pub comment: Option<String>,
    /// Priority snapshot.
    pub priority: Priority,
    /// Cancellation metadata, if cancelled.
    pub cancellation: Option<Cancellation>,
    /// Latest review metadata, if reviewed.
    pub review: Option<ReviewRecord>,
    /// Latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskInstance {
    /// Reconstructs a task instance from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskInstance) -> Self {
        Self {
            id: data.id,
            tenant: data.tenant,
            routine_id: data.routine_id,
            pdv_id: data.pdv_id,
            assignment_id: data.assignment_id,
            scheduled_date: data.scheduled_date,
            deadline_time: data.deadline_time,
            state: data.state,
            audit_status: data.audit_status,
            completed_at: data.completed_at,
            completed_by: data.completed_by,
            gps: data.gps,
            comment: data.comment,
            priority: data.priority,
            cancellation: data.cancellation,
            review: data.review,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskInstanceId {
        self.id
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// Returns the originating routine template identifier.
    #[must_use]
    pub const fn routine_id(&self) -> RoutineId {
        self.routine_id
    }

    /// Returns the point-of-sale identifier.
    #[must_use]
    pub const fn pdv_id(&self) -> PdvId {
        self.pdv_id
    }

    /// Returns the originating recurring assignment, if any.
    #[must_use]
    pub const fn assignment_id(&self) -> Option<AssignmentId> {
        self.assignment_id
    }

    /// Returns the scheduled calendar date.
    #[must_use]
    pub const fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }

    /// Returns the deadline time-of-day snapshot, if any.
    #[must_use]
    pub const fn deadline_time(&self) -> Option<NaiveTime> {
        self.deadline_time
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the audit sub-state.
    #[must_use]
    pub const fn audit_status(&self) -> AuditStatus {
        self.audit_status
    }

    /// Returns the completion instant, if completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the completer, if completed.
    #[must_use]
    pub const fn completed_by(&self) -> Option<UserId> {
        self.completed_by
    }

    /// Returns the persisted GPS capture, if any.
    #[must_use]
    pub const fn gps(&self) -> Option<GpsResult> {
        self.gps
    }

    /// Returns the submission comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the priority snapshot.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the cancellation metadata, if cancelled.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&Cancellation> {
        self.cancellation.as_ref()
    }

    /// Returns the latest review metadata, if reviewed.
    #[must_use]
    pub const fn review(&self) -> Option<&ReviewRecord> {
        self.review.as_ref()
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies the unconditional completion fields: GPS capture, comment,
    /// and the audit reopen rule (`Rejected → Unreviewed`).
    ///
    /// These fields are written by every completion submission, including a
    /// re-submission of an already-completed task after an audit rejection.
    pub fn record_submission_fields(
        &mut self,
        gps: Option<GpsResult>,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) {
        if gps.is_some() {
            self.gps = gps;
        }
        if comment.is_some() {
            self.comment = comment;
        }
        if self.audit_status == AuditStatus::Rejected {
            self.audit_status = AuditStatus::Unreviewed;
            self.review = None;
        }
        self.updated_at = at;
    }

    /// Applies the completion transition when the task is still open.
    ///
    /// Returns `true` when the transition was applied, `false` when the task
    /// had already left its open state (the completion stamp is then left
    /// untouched, matching the store-level conditional update).
    pub fn try_complete(&mut self, state: TaskState, at: DateTime<Utc>, by: UserId) -> bool {
        if !self.state.is_open() || !state.is_completed() {
            return false;
        }
        self.state = state;
        self.completed_at = Some(at);
        self.completed_by = Some(by);
        self.audit_status = AuditStatus::Unreviewed;
        self.updated_at = at;
        true
    }

    /// Records an audit decision on a completed task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotCompleted`] when the task is not in a
    /// completed state.
    pub fn record_review(
        &mut self,
        status: AuditStatus,
        reviewer: UserId,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        if !self.state.is_completed() {
            return Err(TaskDomainError::NotCompleted(self.id));
        }
        self.audit_status = status;
        self.review = Some(ReviewRecord {
            reviewer,
            at,
            note,
        });
        self.updated_at = at;
        Ok(())
    }

    /// Cancels the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CompletedTaskCancellation`] for completed
    /// tasks and [`TaskDomainError::InvalidStateTransition`] for other states
    /// the machine forbids leaving (already cancelled, missed).
    pub fn cancel(
        &mut self,
        by: UserId,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        if self.state.is_completed() {
            return Err(TaskDomainError::CompletedTaskCancellation(self.id));
        }
        if !self.state.can_transition_to(TaskState::Cancelled) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.state,
                to: TaskState::Cancelled,
            });
        }
        self.state = TaskState::Cancelled;
        self.cancellation = Some(Cancellation { at, by, reason });
        self.updated_at = at;
        Ok(())
    }

    /// Marks a pending task as missed. Returns `true` when the transition was
    /// applied; non-pending tasks are left untouched, which is what makes the
    /// sweep idempotent.
    pub fn mark_missed(&mut self, at: DateTime<Utc>) -> bool {
        if self.state != TaskState::Pending {
            return false;
        }
        self.state = TaskState::Missed;
        self.updated_at = at;
        true
    }
}
