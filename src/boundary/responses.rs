//! Wire response shapes.

use crate::notification::domain::EndpointOutcome;
use crate::task::domain::TaskState;
use chrono::NaiveDate;
use serde::Serialize;

/// `complete-task` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteTaskResponse {
    /// Always `true`; failures travel as error bodies.
    pub success: bool,
    /// The task's lifecycle state after the submission.
    pub status: TaskState,
}

/// `audit-execution` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditExecutionResponse {
    /// Always `true`; failures travel as error bodies.
    pub success: bool,
}

/// `cancel-task` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelTaskResponse {
    /// Always `true`; failures travel as error bodies.
    pub success: bool,
    /// Human-readable summary, including the best-effort assignment result.
    pub message: String,
}

/// `mark-missed-tasks` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkMissedResponse {
    /// Always `true`; failures travel as error bodies.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Number of tasks transitioned to missed.
    pub updated: u64,
    /// Cutoff date the sweep ran with.
    pub date: NaiveDate,
}

/// `send-push` response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendPushResponse {
    /// Always `true`; partial per-endpoint failure is still a success.
    pub success: bool,
    /// Per-endpoint outcomes.
    pub results: Vec<EndpointOutcome>,
}
