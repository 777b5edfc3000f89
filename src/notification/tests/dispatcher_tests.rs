//! Service tests for the push fan-out.

use crate::access::UserId;
use crate::notification::{
    adapters::memory::InMemorySubscriptionStore,
    domain::{EndpointOutcome, PushMessage, PushSubscription, SubscriptionId, Urgency},
    ports::{MockPushTransport, PushTransportError},
    services::PushDispatcher,
};
use crate::task::tests::fixtures::{FixedClock, instant};
use rstest::rstest;
use std::sync::Arc;

fn subscription(user: UserId, endpoint: &str) -> PushSubscription {
    PushSubscription {
        id: SubscriptionId::new(),
        user,
        endpoint: endpoint.to_owned(),
        p256dh: "BIPUL12DLfytvTajnryr2PRdAgXS3HGKiLqndGcJGabyhHheJYlNGCeXl1dn18gSJ1WA".to_owned(),
        auth: "FPssNDTKnInHVndSTdbKFw".to_owned(),
        last_used_at: None,
    }
}

fn message() -> PushMessage {
    PushMessage {
        title: "Submission rejected".to_owned(),
        body: "Your Planogram check submission was rejected: blurry photo.".to_owned(),
        url: Some("/tasks/42".to_owned()),
    }
}

fn dispatcher(
    store: &InMemorySubscriptionStore,
    transport: MockPushTransport,
) -> PushDispatcher<InMemorySubscriptionStore, MockPushTransport, FixedClock> {
    PushDispatcher::new(
        Arc::new(store.clone()),
        Arc::new(transport),
        Arc::new(FixedClock(instant("2024-03-11T09:00:00Z"))),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn gone_endpoint_is_pruned_and_the_rest_still_deliver() {
    let store = InMemorySubscriptionStore::new();
    let user = UserId::new();
    let healthy_a = subscription(user, "https://push.example/alpha");
    let dead = subscription(user, "https://push.example/dead");
    let healthy_b = subscription(user, "https://push.example/beta");
    let dead_id = dead.id;
    for entry in [&healthy_a, &dead, &healthy_b] {
        store.insert(entry.clone());
    }

    let mut transport = MockPushTransport::new();
    transport
        .expect_deliver()
        .times(3)
        .returning(|subscription, _delivery| {
            if subscription.endpoint.ends_with("/dead") {
                Err(PushTransportError::EndpointGone)
            } else {
                Ok(())
            }
        });

    let report = dispatcher(&store, transport)
        .dispatch(user, message())
        .await
        .expect("dispatch should succeed");

    assert_eq!(report.outcomes().len(), 3);
    assert_eq!(report.delivered(), 2);
    assert_eq!(report.pruned(), 1);
    assert_eq!(report.failed(), 0);

    // The gone endpoint is deleted; the healthy ones are stamped.
    assert!(store.get(dead_id).is_none());
    assert_eq!(store.len(), 2);
    for id in [healthy_a.id, healthy_b.id] {
        let stamped = store.get(id).expect("subscription should remain");
        assert_eq!(
            stamped.last_used_at,
            Some(instant("2024-03-11T09:00:00Z"))
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn zero_endpoints_is_a_successful_no_op() {
    let store = InMemorySubscriptionStore::new();
    let mut transport = MockPushTransport::new();
    transport.expect_deliver().never();

    let report = dispatcher(&store, transport)
        .dispatch(UserId::new(), message())
        .await
        .expect("dispatch should succeed");

    assert!(report.outcomes().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_failing_endpoint_never_aborts_the_others() {
    let store = InMemorySubscriptionStore::new();
    let user = UserId::new();
    let flaky = subscription(user, "https://push.example/flaky");
    let flaky_id = flaky.id;
    store.insert(flaky);
    store.insert(subscription(user, "https://push.example/alpha"));
    store.insert(subscription(user, "https://push.example/beta"));

    let mut transport = MockPushTransport::new();
    transport
        .expect_deliver()
        .times(3)
        .returning(|subscription, _delivery| {
            if subscription.endpoint.ends_with("/flaky") {
                Err(PushTransportError::Delivery("503 service unavailable".to_owned()))
            } else {
                Ok(())
            }
        });

    let report = dispatcher(&store, transport)
        .dispatch(user, message())
        .await
        .expect("partial failure is still a successful dispatch");

    assert_eq!(report.delivered(), 2);
    assert_eq!(report.failed(), 1);
    let failure = report
        .outcomes()
        .iter()
        .find(|outcome| matches!(outcome, EndpointOutcome::Failed { .. }))
        .expect("one failure outcome");
    assert_eq!(failure.endpoint(), "https://push.example/flaky");

    // Transient failures never prune the endpoint.
    assert!(store.get(flaky_id).is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deliveries_carry_the_platform_ttl_and_urgency() {
    let store = InMemorySubscriptionStore::new();
    let user = UserId::new();
    store.insert(subscription(user, "https://push.example/alpha"));

    let mut transport = MockPushTransport::new();
    transport
        .expect_deliver()
        .withf(|_subscription, delivery| {
            delivery.ttl.as_secs() == 60 && delivery.urgency == Urgency::High
        })
        .times(1)
        .returning(|_subscription, _delivery| Ok(()));

    let report = dispatcher(&store, transport)
        .dispatch(user, message())
        .await
        .expect("dispatch should succeed");
    assert_eq!(report.delivered(), 1);
}
