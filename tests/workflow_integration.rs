//! End-to-end workflow against the in-memory adapters: complete, reject,
//! resubmit, approve — with the notification fan-out observed at each step.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;
use std::sync::{Arc, RwLock};
use vigia::access::{AuthContext, Role, TenantId, UserId};
use vigia::notification::{
    adapters::memory::{InMemoryInbox, InMemorySubscriptionStore},
    domain::{NotificationKind, PushDelivery, PushSubscription, SubscriptionId},
    ports::{PushTransport, PushTransportError},
    services::{AuditReviewNotifier, PushDispatcher},
};
use vigia::task::{
    adapters::memory::InMemoryTaskRepository,
    ports::TaskInstanceRepository,
    domain::{
        AuditStatus, CivilOffset, Coordinates, Pdv, PdvId, PersistedTaskInstance, Priority,
        ReviewDecision, RoutineId, RoutineRules, TaskInstanceId, TaskState,
    },
    services::{CompletionService, ReviewService, SweeperService, TaskSubmission},
};

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Transport that accepts every delivery and remembers the bodies.
#[derive(Debug, Clone, Default)]
struct AcceptingTransport {
    bodies: Arc<RwLock<Vec<String>>>,
}

impl AcceptingTransport {
    fn bodies(&self) -> Vec<String> {
        self.bodies
            .read()
            .map(|bodies| bodies.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PushTransport for AcceptingTransport {
    async fn deliver(
        &self,
        _subscription: &PushSubscription,
        delivery: &PushDelivery,
    ) -> Result<(), PushTransportError> {
        if let Ok(mut bodies) = self.bodies.write() {
            bodies.push(delivery.message.body.clone());
        }
        Ok(())
    }
}

fn instant(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("valid RFC 3339 instant")
        .with_timezone(&Utc)
}

fn date(value: &str) -> NaiveDate {
    value.parse().expect("valid ISO date")
}

const SITE: Coordinates = Coordinates::new(4.609_71, -74.081_75);

struct World {
    tasks: InMemoryTaskRepository,
    subscriptions: InMemorySubscriptionStore,
    inbox: InMemoryInbox,
    transport: AcceptingTransport,
    tenant: TenantId,
    task_id: TaskInstanceId,
    field_user: AuthContext,
    supervisor: AuthContext,
}

impl World {
    fn new() -> Self {
        let tasks = InMemoryTaskRepository::new();
        let tenant = TenantId::new();
        let field_user = AuthContext::new(UserId::new(), tenant, Role::Field);
        let supervisor = AuthContext::new(UserId::new(), tenant, Role::Supervisor);

        let routine = RoutineRules {
            id: RoutineId::new(),
            name: "Planogram check".to_owned(),
            gps_required: true,
            inventory_required: false,
        };
        let pdv = Pdv {
            id: PdvId::new(),
            location: Some(SITE),
            radius_meters: Some(100.0),
        };
        let task_id = TaskInstanceId::new();
        tasks.insert_task(vigia::task::domain::TaskInstance::from_persisted(
            PersistedTaskInstance {
                id: task_id,
                tenant,
                routine_id: routine.id,
                pdv_id: pdv.id,
                assignment_id: None,
                scheduled_date: date("2024-03-10"),
                deadline_time: None,
                state: TaskState::Pending,
                audit_status: AuditStatus::Unreviewed,
                completed_at: None,
                completed_by: None,
                gps: None,
                comment: None,
                priority: Priority::High,
                cancellation: None,
                review: None,
                updated_at: instant("2024-03-01T12:00:00Z"),
            },
        ));
        tasks.insert_routine(routine);
        tasks.insert_pdv(pdv);

        let subscriptions = InMemorySubscriptionStore::new();
        subscriptions.insert(PushSubscription {
            id: SubscriptionId::new(),
            user: field_user.user(),
            endpoint: "https://push.example/device-1".to_owned(),
            p256dh: "key".to_owned(),
            auth: "secret".to_owned(),
            last_used_at: None,
        });

        Self {
            tasks,
            subscriptions,
            inbox: InMemoryInbox::new(),
            transport: AcceptingTransport::default(),
            tenant,
            task_id,
            field_user,
            supervisor,
        }
    }

    fn completion_at(
        &self,
        now: &str,
    ) -> CompletionService<InMemoryTaskRepository, FixedClock> {
        CompletionService::new(
            Arc::new(self.tasks.clone()),
            Arc::new(FixedClock(instant(now))),
            CivilOffset::UTC_MINUS_5,
        )
    }

    fn review_at(
        &self,
        now: &str,
    ) -> ReviewService<
        InMemoryTaskRepository,
        AuditReviewNotifier<
            InMemorySubscriptionStore,
            AcceptingTransport,
            InMemoryInbox,
            FixedClock,
        >,
        FixedClock,
    > {
        let clock = Arc::new(FixedClock(instant(now)));
        let dispatcher = PushDispatcher::new(
            Arc::new(self.subscriptions.clone()),
            Arc::new(self.transport.clone()),
            Arc::clone(&clock),
        );
        let notifier =
            AuditReviewNotifier::new(dispatcher, Arc::new(self.inbox.clone()), Arc::clone(&clock));
        ReviewService::new(Arc::new(self.tasks.clone()), Arc::new(notifier), clock)
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_reject_resubmit_approve_cycle() {
    let world = World::new();

    // 1. The field user completes on time (22:30 local).
    let applied = world
        .completion_at("2024-03-11T03:30:00Z")
        .complete(
            world.task_id,
            &world.field_user,
            TaskSubmission {
                gps: Some(SITE),
                inventory: None,
                comment: Some("shelves restocked".to_owned()),
            },
        )
        .await
        .expect("completion should succeed");
    assert!(applied.transitioned);
    assert_eq!(applied.task.state(), TaskState::CompletedOnTime);
    assert_eq!(applied.task.audit_status(), AuditStatus::Unreviewed);

    // 2. The supervisor rejects; the field user is notified with the note.
    let rejected = world
        .review_at("2024-03-11T09:00:00Z")
        .review(
            world.task_id,
            &world.supervisor,
            ReviewDecision::Rejected,
            Some("left aisle not photographed".to_owned()),
        )
        .await
        .expect("rejection should succeed");
    assert_eq!(rejected.task.audit_status(), AuditStatus::Rejected);
    assert_eq!(rejected.task.state(), TaskState::CompletedOnTime);

    let bodies = world.transport.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(
        bodies
            .first()
            .expect("one push")
            .contains("left aisle not photographed")
    );
    let records = world.inbox.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records.first().expect("one record").kind,
        NotificationKind::AuditRejected
    );

    // 3. The field user resubmits; the original stamp survives and the audit
    //    reopens.
    let resubmitted = world
        .completion_at("2024-03-11T14:00:00Z")
        .complete(
            world.task_id,
            &world.field_user,
            TaskSubmission {
                gps: Some(SITE),
                inventory: None,
                comment: Some("left aisle added".to_owned()),
            },
        )
        .await
        .expect("resubmission should succeed");
    assert!(!resubmitted.transitioned);
    assert_eq!(resubmitted.task.state(), TaskState::CompletedOnTime);
    assert_eq!(
        resubmitted.task.completed_at(),
        Some(instant("2024-03-11T03:30:00Z"))
    );
    assert_eq!(resubmitted.task.audit_status(), AuditStatus::Unreviewed);

    // 4. The supervisor approves; a second notification goes out.
    let approved = world
        .review_at("2024-03-11T16:00:00Z")
        .review(world.task_id, &world.supervisor, ReviewDecision::Approved, None)
        .await
        .expect("approval should succeed");
    assert_eq!(approved.task.audit_status(), AuditStatus::Approved);
    assert_eq!(world.transport.bodies().len(), 2);
    assert_eq!(world.inbox.records().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn sweeper_skips_completed_work_and_is_idempotent() {
    let world = World::new();

    // Complete the seeded task, then add an overdue pending one.
    world
        .completion_at("2024-03-11T03:30:00Z")
        .complete(
            world.task_id,
            &world.field_user,
            TaskSubmission {
                gps: Some(SITE),
                inventory: None,
                comment: None,
            },
        )
        .await
        .expect("completion should succeed");

    let overdue_id = TaskInstanceId::new();
    world
        .tasks
        .insert_task(vigia::task::domain::TaskInstance::from_persisted(
            PersistedTaskInstance {
                id: overdue_id,
                tenant: world.tenant,
                routine_id: RoutineId::new(),
                pdv_id: PdvId::new(),
                assignment_id: None,
                scheduled_date: date("2024-03-09"),
                deadline_time: None,
                state: TaskState::Pending,
                audit_status: AuditStatus::Unreviewed,
                completed_at: None,
                completed_by: None,
                gps: None,
                comment: None,
                priority: Priority::Medium,
                cancellation: None,
                review: None,
                updated_at: instant("2024-03-01T12:00:00Z"),
            },
        ));

    let sweeper = SweeperService::new(
        Arc::new(world.tasks.clone()),
        Arc::new(FixedClock(instant("2024-03-11T06:00:00Z"))),
        CivilOffset::UTC_MINUS_5,
    );
    let system = AuthContext::new(UserId::new(), TenantId::new(), Role::System);

    let first = sweeper
        .sweep(&system, None)
        .await
        .expect("sweep should succeed");
    assert_eq!(first.updated, 1);

    let second = sweeper
        .sweep(&system, None)
        .await
        .expect("sweep should succeed");
    assert_eq!(second.updated, 0);

    let completed = world
        .tasks
        .find_by_id(world.task_id)
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(completed.state(), TaskState::CompletedOnTime);
}
