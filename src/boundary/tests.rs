//! Tests for the boundary contracts: authentication, status mapping, and
//! handler wiring.

use super::{
    auth::{CredentialError, CredentialVerifier, authenticate},
    error::BoundaryError,
    handlers,
    requests::{
        CancelTaskRequest, CompleteTaskRequest, GpsPayload, MarkMissedRequest, SendPushRequest,
    },
};
use crate::access::{AuthContext, Role, TenantId, UserId};
use crate::notification::{
    adapters::memory::InMemorySubscriptionStore, ports::MockPushTransport,
    services::PushDispatcher,
};
use crate::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository},
    domain::{CivilOffset, TaskDomainError, TaskInstanceId, TaskState},
    services::{CancelScope, CancellationService, CompletionService, SweeperService},
    tests::fixtures::{
        FixedClock, SITE, date, director_actor, field_actor, instant, pdv_at, routine,
        system_actor, task_from, task_seed,
    },
};
use async_trait::async_trait;
use rstest::rstest;
use std::sync::Arc;

/// Verifier backed by a single known token.
struct SingleTokenVerifier {
    token: &'static str,
    context: AuthContext,
}

#[async_trait]
impl CredentialVerifier for SingleTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthContext, CredentialError> {
        if token == self.token {
            Ok(self.context)
        } else {
            Err(CredentialError::Invalid)
        }
    }
}

fn verifier() -> SingleTokenVerifier {
    SingleTokenVerifier {
        token: "good-token",
        context: AuthContext::new(UserId::new(), TenantId::new(), Role::Field),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_valid_bearer_token_authenticates() {
    let verifier = verifier();
    let context = authenticate(&verifier, Some("Bearer good-token"))
        .await
        .expect("authentication should succeed");
    assert_eq!(context, verifier.context);
}

#[rstest]
#[case(None)]
#[case(Some("good-token"))]
#[case(Some("Basic good-token"))]
#[case(Some("Bearer "))]
#[case(Some("Bearer wrong-token"))]
#[tokio::test(flavor = "multi_thread")]
async fn missing_or_invalid_credentials_are_unauthorized(#[case] header: Option<&str>) {
    let result = authenticate(&verifier(), header).await;
    let Err(err) = result else {
        panic!("expected an authentication rejection");
    };
    assert_eq!(err.status_code(), 401);
}

#[rstest]
#[case(BoundaryError::Authentication, 401)]
#[case(BoundaryError::Authorization("role may not cancel tasks".to_owned()), 403)]
#[case(BoundaryError::Validation("a rejection review requires a note".to_owned()), 400)]
#[case(BoundaryError::NotFound("task not found".to_owned()), 404)]
#[case(BoundaryError::OutOfRange { distance: 150.0, limit: 100.0 }, 400)]
#[case(BoundaryError::Config("site has no coordinates".to_owned()), 400)]
#[case(
    BoundaryError::Store(Arc::new(std::io::Error::other("connection reset"))),
    500
)]
fn status_codes_follow_the_taxonomy(#[case] err: BoundaryError, #[case] expected: u16) {
    assert_eq!(err.status_code(), expected);
}

#[rstest]
fn store_errors_keep_their_details_server_side() {
    let err = BoundaryError::Store(Arc::new(std::io::Error::other("connection reset")));
    assert_eq!(err.body().error, "internal storage error");
}

#[rstest]
fn out_of_range_bodies_carry_distance_and_limit() {
    let err = BoundaryError::from(crate::task::services::CompletionError::Domain(
        TaskDomainError::OutOfRange {
            distance_meters: 150.4,
            limit_meters: 100.0,
        },
    ));
    assert_eq!(err.status_code(), 400);
    let body = err.body().error;
    assert!(body.contains("150"), "body should carry the distance: {body}");
    assert!(body.contains("100"), "body should carry the limit: {body}");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn complete_task_handler_reports_the_resulting_state() {
    let repository = InMemoryTaskRepository::new();
    let tenant = TenantId::new();
    let rules = routine(true, false);
    let pdv = pdv_at(SITE, None);
    let seed = task_seed(tenant, rules.id, pdv.id, date("2024-03-10"));
    let task_id = seed.id;
    repository.insert_routine(rules);
    repository.insert_pdv(pdv);
    repository.insert_task(task_from(seed));

    let service = CompletionService::new(
        Arc::new(repository),
        Arc::new(FixedClock(instant("2024-03-11T03:30:00Z"))),
        CivilOffset::UTC_MINUS_5,
    );

    let response = handlers::complete_task(
        &service,
        &field_actor(tenant),
        CompleteTaskRequest {
            task_id,
            gps_data: Some(GpsPayload {
                lat: SITE.latitude,
                lng: SITE.longitude,
            }),
            inventory: None,
            comments: None,
        },
    )
    .await
    .expect("handler should succeed");

    assert!(response.success);
    assert_eq!(response.status, TaskState::CompletedOnTime);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancel_task_handler_reports_the_assignment_outcome() {
    let repository = InMemoryTaskRepository::new();
    let tenant = TenantId::new();
    let rules = routine(false, false);
    let pdv = pdv_at(SITE, None);
    let seed = task_seed(tenant, rules.id, pdv.id, date("2024-03-10"));
    let task_id = seed.id;
    repository.insert_routine(rules);
    repository.insert_pdv(pdv);
    repository.insert_task(task_from(seed));

    let service = CancellationService::new(
        Arc::new(repository),
        Arc::new(InMemoryAuditLog::new()),
        Arc::new(FixedClock(instant("2024-03-10T15:00:00Z"))),
    );

    let response = handlers::cancel_task(
        &service,
        &director_actor(tenant),
        CancelTaskRequest {
            task_id,
            reason: "site flooded".to_owned(),
            scope: CancelScope::Today,
        },
    )
    .await
    .expect("handler should succeed");

    assert!(response.success);
    assert_eq!(response.message, "Task cancelled");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mark_missed_handler_reports_count_and_date() {
    let repository = InMemoryTaskRepository::new();
    let rules = routine(false, false);
    let pdv = pdv_at(SITE, None);
    let tenant = TenantId::new();
    let mut seed = task_seed(tenant, rules.id, pdv.id, date("2024-03-08"));
    seed.state = TaskState::Pending;
    repository.insert_routine(rules);
    repository.insert_pdv(pdv);
    repository.insert_task(task_from(seed));

    let service = SweeperService::new(
        Arc::new(repository),
        Arc::new(FixedClock(instant("2024-03-11T03:00:00Z"))),
        CivilOffset::UTC_MINUS_5,
    );

    let response = handlers::mark_missed_tasks(
        &service,
        &system_actor(),
        MarkMissedRequest { date: None },
    )
    .await
    .expect("handler should succeed");

    assert!(response.success);
    assert_eq!(response.updated, 1);
    assert_eq!(response.date, date("2024-03-10"));
    assert!(response.message.contains('1'));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn send_push_requires_the_system_credential() {
    let store = InMemorySubscriptionStore::new();
    let mut transport = MockPushTransport::new();
    transport.expect_deliver().never();
    let dispatcher = PushDispatcher::new(
        Arc::new(store),
        Arc::new(transport),
        Arc::new(FixedClock(instant("2024-03-11T09:00:00Z"))),
    );

    let request = SendPushRequest {
        user_id: UserId::new(),
        title: "Maintenance window".to_owned(),
        body: "Tonight 22:00".to_owned(),
        url: None,
    };
    let denied = handlers::send_push(
        &dispatcher,
        &director_actor(TenantId::new()),
        request.clone(),
    )
    .await;
    let Err(err) = denied else {
        panic!("expected a permission rejection");
    };
    assert_eq!(err.status_code(), 403);

    let response = handlers::send_push(&dispatcher, &system_actor(), request)
        .await
        .expect("system credential may send");
    assert!(response.success);
    assert!(response.results.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_maps_to_not_found() {
    let repository = InMemoryTaskRepository::new();
    let service = CompletionService::new(
        Arc::new(repository),
        Arc::new(FixedClock(instant("2024-03-11T03:30:00Z"))),
        CivilOffset::UTC_MINUS_5,
    );

    let result = handlers::complete_task(
        &service,
        &field_actor(TenantId::new()),
        CompleteTaskRequest {
            task_id: TaskInstanceId::new(),
            gps_data: None,
            inventory: None,
            comments: None,
        },
    )
    .await;
    let Err(err) = result else {
        panic!("expected a not-found rejection");
    };
    assert_eq!(err.status_code(), 404);
}
