//! Lifecycle state machine and audit review sub-state.

use super::{ParseAuditStatusError, ParseTaskStateError};
use serde::{Deserialize, Serialize};

/// Task-instance lifecycle state.
///
/// Transitions are monotonic: once a task reaches a completed, cancelled, or
/// missed state it never returns to an open state. The audit review cycle is
/// layered on top of the completed states as [`AuditStatus`] and never moves
/// the outer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task has been generated but work has not started.
    Pending,
    /// A field user has started working on the task.
    InProgress,
    /// Task was submitted at or before its deadline.
    CompletedOnTime,
    /// Task was submitted after its deadline.
    CompletedLate,
    /// Task was cancelled by an administrator.
    Cancelled,
    /// Task passed its deadline without a submission and was swept.
    Missed,
}

impl TaskState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::CompletedOnTime => "completed_on_time",
            Self::CompletedLate => "completed_late",
            Self::Cancelled => "cancelled",
            Self::Missed => "missed",
        }
    }

    /// Returns `true` while the task still accepts a completion submission.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Returns `true` for either completed variant.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::CompletedOnTime | Self::CompletedLate)
    }

    /// Returns `true` when no further lifecycle transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Missed)
    }

    /// Returns `true` when the lifecycle state machine permits moving from
    /// `self` to `target`.
    ///
    /// The sweeper edge (`pending → missed`) is included here; the sweeper
    /// service is its only caller. Completed states accept no outgoing edge:
    /// cancellation of a completed task is rejected with a dedicated domain
    /// error before this guard is consulted.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::InProgress)
                | (Self::Pending | Self::InProgress, Self::CompletedOnTime)
                | (Self::Pending | Self::InProgress, Self::CompletedLate)
                | (Self::Pending | Self::InProgress, Self::Cancelled)
                | (Self::Pending, Self::Missed)
        )
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed_on_time" => Ok(Self::CompletedOnTime),
            "completed_late" => Ok(Self::CompletedLate),
            "cancelled" => Ok(Self::Cancelled),
            "missed" => Ok(Self::Missed),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Audit review sub-state carried by completed tasks.
///
/// `Rejected → Unreviewed` is the only backward edge: a resubmission after a
/// rejection implicitly requests re-review. The outer [`TaskState`] is never
/// changed by audit transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Completed work awaiting review.
    Unreviewed,
    /// Reviewer accepted the submission.
    Approved,
    /// Reviewer rejected the submission; the task is open for correction.
    Rejected,
}

impl AuditStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unreviewed => "unreviewed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A reviewer's decision over a completed task.
///
/// Distinct from [`AuditStatus`]: `Unreviewed` is a state a task can hold but
/// never a decision a reviewer can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Accept the submission.
    Approved,
    /// Reject the submission and reopen it for correction.
    Rejected,
}

impl ReviewDecision {
    /// Returns the audit status this decision writes.
    #[must_use]
    pub const fn as_audit_status(self) -> AuditStatus {
        match self {
            Self::Approved => AuditStatus::Approved,
            Self::Rejected => AuditStatus::Rejected,
        }
    }
}

impl TryFrom<&str> for AuditStatus {
    type Error = ParseAuditStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unreviewed" => Ok(Self::Unreviewed),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseAuditStatusError(value.to_owned())),
        }
    }
}
