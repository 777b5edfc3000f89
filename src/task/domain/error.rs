//! Error types for task domain validation and parsing.

use super::{PdvId, TaskInstanceId, TaskState};
use thiserror::Error;

/// Errors raised by domain rules during lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskDomainError {
    /// The lifecycle state machine forbids the requested transition.
    #[error("invalid state transition for task {task_id}: {from:?} -> {to:?}")]
    InvalidStateTransition {
        /// Task whose transition was rejected.
        task_id: TaskInstanceId,
        /// State the task currently holds.
        from: TaskState,
        /// State the caller requested.
        to: TaskState,
    },

    /// Cancellation was requested for an already-completed task.
    #[error("cannot cancel a completed task: {0}")]
    CompletedTaskCancellation(TaskInstanceId),

    /// An audit review was requested for a task that is not completed.
    #[error("task {0} is not completed and cannot be reviewed")]
    NotCompleted(TaskInstanceId),

    /// The routine mandates GPS but the submission carried no coordinates.
    #[error("task {0} requires GPS coordinates")]
    MissingCoordinates(TaskInstanceId),

    /// The routine mandates GPS but the point of sale has no configured
    /// location to validate against.
    #[error("point of sale {0} has no configured coordinates")]
    PdvNotGeolocated(PdvId),

    /// The routine mandates inventory but the submission carried no rows.
    #[error("task {0} requires an inventory submission")]
    MissingInventory(TaskInstanceId),

    /// The submission's coordinates fall outside the site's acceptance
    /// radius. Carries the measured distance and the limit for user-facing
    /// display.
    #[error("submission is {distance_meters:.0} m from the site, limit {limit_meters:.0} m")]
    OutOfRange {
        /// Measured great-circle distance in meters.
        distance_meters: f64,
        /// Acceptance radius in meters.
        limit_meters: f64,
    },

    /// A rejection review carried no note.
    #[error("a rejection review requires a note")]
    EmptyRejectionNote,

    /// A cancellation carried no reason.
    #[error("a cancellation requires a reason")]
    EmptyCancellationReason,
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing audit statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown audit status: {0}")]
pub struct ParseAuditStatusError(pub String);

/// Error returned while parsing priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);
