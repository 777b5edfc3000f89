//! Unit tests for review message rendering.

use crate::access::UserId;
use crate::notification::services::ReviewMessages;
use crate::task::{
    domain::{ReviewDecision, TaskInstanceId},
    ports::ReviewNotice,
};
use rstest::rstest;

fn notice(decision: ReviewDecision, note: Option<&str>) -> ReviewNotice {
    ReviewNotice {
        recipient: UserId::new(),
        task_id: TaskInstanceId::new(),
        routine_name: "Cooler audit".to_owned(),
        decision,
        note: note.map(str::to_owned),
    }
}

#[rstest]
fn approval_message_names_the_routine() {
    let message = ReviewMessages::new()
        .render(&notice(ReviewDecision::Approved, None))
        .expect("rendering should succeed");

    assert_eq!(message.title, "Submission approved");
    assert_eq!(message.body, "Your Cooler audit submission was approved.");
}

#[rstest]
fn rejection_message_embeds_the_routine_and_the_note() {
    let message = ReviewMessages::new()
        .render(&notice(ReviewDecision::Rejected, Some("blurry photo")))
        .expect("rendering should succeed");

    assert_eq!(message.title, "Submission rejected");
    assert!(message.body.contains("Cooler audit"));
    assert!(message.body.contains("blurry photo"));
}

#[rstest]
fn messages_deep_link_to_the_task() {
    let subject = notice(ReviewDecision::Approved, None);
    let message = ReviewMessages::new()
        .render(&subject)
        .expect("rendering should succeed");
    let url = message.url.expect("a deep link");
    assert!(url.ends_with(&subject.task_id.to_string()));
}
