//! Operation handlers: authenticated context + wire payload → wire response.
//!
//! Handlers adapt between the wire contracts and the services; every business
//! rule lives in the services and the domain. Each handler is stateless and
//! independent; none calls another.

use super::{
    error::BoundaryError,
    requests::{
        AuditExecutionRequest, CancelTaskRequest, CompleteTaskRequest, MarkMissedRequest,
        SendPushRequest,
    },
    responses::{
        AuditExecutionResponse, CancelTaskResponse, CompleteTaskResponse, MarkMissedResponse,
        SendPushResponse,
    },
};
use crate::access::AuthContext;
use crate::notification::{
    domain::PushMessage,
    ports::{PushSubscriptionRepository, PushTransport},
    services::PushDispatcher,
};
use crate::task::{
    ports::{AuditLogRecorder, ReviewNotifier, TaskInstanceRepository},
    services::{
        AssignmentOutcome, CancellationService, CompletionService, ReviewService, SweeperService,
    },
};
use mockable::Clock;

/// Handles `complete-task`.
///
/// # Errors
///
/// Propagates the completion service's failure mapped into the boundary
/// taxonomy.
pub async fn complete_task<R, C>(
    service: &CompletionService<R, C>,
    actor: &AuthContext,
    request: CompleteTaskRequest,
) -> Result<CompleteTaskResponse, BoundaryError>
where
    R: TaskInstanceRepository,
    C: Clock + Send + Sync,
{
    let task_id = request.task_id;
    let applied = service
        .complete(task_id, actor, request.into_submission())
        .await?;
    Ok(CompleteTaskResponse {
        success: true,
        status: applied.task.state(),
    })
}

/// Handles `audit-execution`.
///
/// # Errors
///
/// Propagates the review service's failure mapped into the boundary
/// taxonomy. A failed notification is not a failure: the audit decision is
/// the source of truth.
pub async fn audit_execution<R, N, C>(
    service: &ReviewService<R, N, C>,
    actor: &AuthContext,
    request: AuditExecutionRequest,
) -> Result<AuditExecutionResponse, BoundaryError>
where
    R: TaskInstanceRepository,
    N: ReviewNotifier,
    C: Clock + Send + Sync,
{
    service
        .review(request.task_id, actor, request.status, request.note)
        .await?;
    Ok(AuditExecutionResponse { success: true })
}

/// Handles `cancel-task`.
///
/// # Errors
///
/// Propagates the cancellation service's failure mapped into the boundary
/// taxonomy. Assignment deactivation is best-effort and reported in the
/// message instead.
pub async fn cancel_task<R, A, C>(
    service: &CancellationService<R, A, C>,
    actor: &AuthContext,
    request: CancelTaskRequest,
) -> Result<CancelTaskResponse, BoundaryError>
where
    R: TaskInstanceRepository,
    A: AuditLogRecorder,
    C: Clock + Send + Sync,
{
    let outcome = service
        .cancel(request.task_id, actor, &request.reason, request.scope)
        .await?;

    let message = match &outcome.assignment {
        AssignmentOutcome::NotRequested | AssignmentOutcome::NotLinked => {
            "Task cancelled".to_owned()
        }
        AssignmentOutcome::Deactivated => {
            "Task cancelled; recurring assignment deactivated".to_owned()
        }
        AssignmentOutcome::Failed(reason) => {
            format!("Task cancelled; assignment deactivation failed: {reason}")
        }
    };
    Ok(CancelTaskResponse {
        success: true,
        message,
    })
}

/// Handles `mark-missed-tasks`.
///
/// # Errors
///
/// Propagates the sweeper's failure mapped into the boundary taxonomy.
pub async fn mark_missed_tasks<R, C>(
    service: &SweeperService<R, C>,
    actor: &AuthContext,
    request: MarkMissedRequest,
) -> Result<MarkMissedResponse, BoundaryError>
where
    R: TaskInstanceRepository,
    C: Clock + Send + Sync,
{
    let outcome = service.sweep(actor, request.date).await?;
    Ok(MarkMissedResponse {
        success: true,
        message: format!("{} overdue tasks marked as missed", outcome.updated),
        updated: outcome.updated,
        date: outcome.cutoff,
    })
}

/// Handles `send-push`, the collaborator boundary consumed by internal
/// services.
///
/// # Errors
///
/// Returns [`BoundaryError::Authorization`] for non-system callers and
/// propagates the dispatcher's store failure. Per-endpoint failures are
/// reported in the results, never as an operation failure.
pub async fn send_push<S, T, C>(
    dispatcher: &PushDispatcher<S, T, C>,
    actor: &AuthContext,
    request: SendPushRequest,
) -> Result<SendPushResponse, BoundaryError>
where
    S: PushSubscriptionRepository + 'static,
    T: PushTransport + 'static,
    C: Clock + Send + Sync,
{
    if !actor.role().is_system() {
        return Err(BoundaryError::Authorization(
            "send-push requires the system credential".to_owned(),
        ));
    }

    let message = PushMessage {
        title: request.title,
        body: request.body,
        url: request.url,
    };
    let report = dispatcher.dispatch(request.user_id, message).await?;
    Ok(SendPushResponse {
        success: true,
        results: report.outcomes().to_vec(),
    })
}
