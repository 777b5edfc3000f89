//! Rendered message pairs for audit review notifications.

use crate::notification::domain::PushMessage;
use crate::task::{domain::ReviewDecision, ports::ReviewNotice};
use minijinja::Environment;
use serde_json::json;
use thiserror::Error;

const APPROVED_TITLE: &str = "Submission approved";
const APPROVED_BODY: &str = "Your {{ routine }} submission was approved.";
const REJECTED_TITLE: &str = "Submission rejected";
const REJECTED_BODY: &str =
    "Your {{ routine }} submission was rejected: {{ note }}. Please correct and resubmit.";

/// Template rendering failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render review message: {0}")]
pub struct RenderError(pub String);

/// Renders the title/body pair for a review decision.
///
/// Approval and rejection messaging differ: a rejection embeds the routine
/// name and the reviewer's note so the field user knows exactly what to fix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewMessages;

impl ReviewMessages {
    /// Creates the renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders the message for `notice`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the template cannot be rendered.
    pub fn render(&self, notice: &ReviewNotice) -> Result<PushMessage, RenderError> {
        let environment = Environment::new();
        let context = json!({
            "routine": notice.routine_name,
            "note": notice.note.as_deref().unwrap_or_default(),
        });
        let (title, body_template) = match notice.decision {
            ReviewDecision::Approved => (APPROVED_TITLE, APPROVED_BODY),
            ReviewDecision::Rejected => (REJECTED_TITLE, REJECTED_BODY),
        };
        let body = environment
            .render_str(body_template, context)
            .map_err(|error| RenderError(error.to_string()))?;
        Ok(PushMessage {
            title: title.to_owned(),
            body,
            url: Some(format!("/tasks/{}", notice.task_id)),
        })
    }
}
