//! Service tests for administrative cancellation.

use super::fixtures::{
    FixedClock, SITE, date, director_actor, field_actor, instant, pdv_at, routine, task_from,
    task_seed,
};
use crate::access::TenantId;
use crate::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository, StoredAssignment},
    domain::{AssignmentId, TaskDomainError, TaskInstanceId, TaskState},
    ports::AuditAction,
    services::{
        AssignmentOutcome, CancelScope, CancellationError, CancellationService,
    },
};
use crate::task::ports::TaskInstanceRepository;
use rstest::rstest;
use std::sync::Arc;

type Service = CancellationService<InMemoryTaskRepository, InMemoryAuditLog, FixedClock>;

struct Harness {
    repository: InMemoryTaskRepository,
    audit_log: InMemoryAuditLog,
    service: Service,
    tenant: TenantId,
    task_id: TaskInstanceId,
    assignment_id: AssignmentId,
}

/// Seeds a pending task linked to an active recurring assignment.
fn harness() -> Harness {
    let repository = InMemoryTaskRepository::new();
    let audit_log = InMemoryAuditLog::new();
    let tenant = TenantId::new();
    let rules = routine(false, false);
    let pdv = pdv_at(SITE, None);
    let assignment_id = AssignmentId::new();

    let mut seed = task_seed(tenant, rules.id, pdv.id, date("2024-03-10"));
    seed.assignment_id = Some(assignment_id);
    let task_id = seed.id;

    repository.insert_routine(rules);
    repository.insert_pdv(pdv);
    repository.insert_task(task_from(seed));
    repository.insert_assignment(
        assignment_id,
        StoredAssignment {
            active: true,
            notes: Some("weekly planogram".to_owned()),
        },
    );

    let service = CancellationService::new(
        Arc::new(repository.clone()),
        Arc::new(audit_log.clone()),
        Arc::new(FixedClock(instant("2024-03-10T15:00:00Z"))),
    );
    Harness {
        repository,
        audit_log,
        service,
        tenant,
        task_id,
        assignment_id,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn director_cancels_a_pending_task_for_today_only() {
    let harness = harness();
    let director = director_actor(harness.tenant);

    let outcome = harness
        .service
        .cancel(harness.task_id, &director, "site flooded", CancelScope::Today)
        .await
        .expect("cancellation should succeed");

    assert_eq!(outcome.task.state(), TaskState::Cancelled);
    let cancellation = outcome.task.cancellation().expect("metadata stamped");
    assert_eq!(cancellation.by, director.user());
    assert_eq!(cancellation.reason, "site flooded");
    assert_eq!(outcome.assignment, AssignmentOutcome::NotRequested);

    // The recurring assignment is untouched for a today-only cancellation.
    let assignment = harness
        .repository
        .assignment(harness.assignment_id)
        .expect("assignment should exist");
    assert!(assignment.active);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn future_scope_deactivates_the_recurring_assignment() {
    let harness = harness();
    let director = director_actor(harness.tenant);

    let outcome = harness
        .service
        .cancel(
            harness.task_id,
            &director,
            "store closing down",
            CancelScope::Future,
        )
        .await
        .expect("cancellation should succeed");

    assert_eq!(outcome.assignment, AssignmentOutcome::Deactivated);
    let assignment = harness
        .repository
        .assignment(harness.assignment_id)
        .expect("assignment should exist");
    assert!(!assignment.active);
    let notes = assignment.notes.expect("notes should carry the reason");
    assert!(notes.contains("store closing down"));
    assert!(notes.contains("weekly planogram"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_assignment_fails_distinctly_without_failing_the_cancellation() {
    let harness = harness();
    let director = director_actor(harness.tenant);

    // Point the task at an assignment that no longer exists.
    let mut seed = task_seed(
        harness.tenant,
        crate::task::domain::RoutineId::new(),
        crate::task::domain::PdvId::new(),
        date("2024-03-10"),
    );
    seed.id = harness.task_id;
    seed.assignment_id = Some(AssignmentId::new());
    harness.repository.insert_task(task_from(seed));

    let outcome = harness
        .service
        .cancel(harness.task_id, &director, "obsolete", CancelScope::Future)
        .await
        .expect("cancellation itself should succeed");

    assert_eq!(outcome.task.state(), TaskState::Cancelled);
    assert!(matches!(outcome.assignment, AssignmentOutcome::Failed(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancellation_appends_an_audit_log_entry() {
    let harness = harness();
    let director = director_actor(harness.tenant);

    harness
        .service
        .cancel(harness.task_id, &director, "duplicate", CancelScope::Today)
        .await
        .expect("cancellation should succeed");

    let entries = harness.audit_log.entries();
    assert_eq!(entries.len(), 1);
    let entry = entries.first().expect("one entry");
    assert_eq!(entry.actor, director.user());
    assert_eq!(entry.action, AuditAction::TaskCancelled);
    assert_eq!(entry.table_name, "task_instances");
    assert_eq!(entry.record_id, harness.task_id.into_inner());
    assert_eq!(
        entry.new_values.get("reason").and_then(|value| value.as_str()),
        Some("duplicate")
    );
    assert_eq!(
        entry.new_values.get("state").and_then(|value| value.as_str()),
        Some("cancelled")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn field_role_may_not_cancel() {
    let harness = harness();
    let field_user = field_actor(harness.tenant);

    let result = harness
        .service
        .cancel(harness.task_id, &field_user, "oops", CancelScope::Today)
        .await;
    assert!(matches!(result, Err(CancellationError::PermissionDenied)));

    let task = harness
        .repository
        .find_by_id(harness.task_id)
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(task.state(), TaskState::Pending);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_reason_is_rejected() {
    let harness = harness();
    let director = director_actor(harness.tenant);

    let result = harness
        .service
        .cancel(harness.task_id, &director, "   ", CancelScope::Today)
        .await;
    assert!(matches!(
        result,
        Err(CancellationError::Domain(
            TaskDomainError::EmptyCancellationReason
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_cannot_be_cancelled() {
    let harness = harness();
    let director = director_actor(harness.tenant);

    let mut completed = harness
        .repository
        .find_by_id(harness.task_id)
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert!(completed.try_complete(
        TaskState::CompletedOnTime,
        instant("2024-03-10T14:00:00Z"),
        director.user(),
    ));
    harness.repository.insert_task(completed);

    let result = harness
        .service
        .cancel(harness.task_id, &director, "late change", CancelScope::Today)
        .await;
    assert!(matches!(
        result,
        Err(CancellationError::Domain(
            TaskDomainError::CompletedTaskCancellation(_)
        ))
    ));

    let task = harness
        .repository
        .find_by_id(harness.task_id)
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(task.state(), TaskState::CompletedOnTime);
    assert!(harness.audit_log.entries().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_tenant_cancellation_is_rejected() {
    let harness = harness();
    let outsider = director_actor(TenantId::new());

    let result = harness
        .service
        .cancel(harness.task_id, &outsider, "not yours", CancelScope::Today)
        .await;
    assert!(matches!(result, Err(CancellationError::TenantMismatch(_))));
}
