//! Wire request shapes.
//!
//! Field names follow the reference transport's JSON contract: operation
//! payloads are camel-cased, inventory lines keep the legacy field names the
//! mobile clients already send (`producto_id`, `esperado`, `fisico`).

use crate::access::UserId;
use crate::task::{
    domain::{Coordinates, InventoryLine, ProductId, ReviewDecision, TaskInstanceId},
    services::{CancelScope, TaskSubmission},
};
use chrono::NaiveDate;
use serde::Deserialize;

/// `complete-task` request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    /// Task to complete.
    pub task_id: TaskInstanceId,
    /// Captured device coordinates.
    #[serde(default)]
    pub gps_data: Option<GpsPayload>,
    /// Inventory counts, replacing any previously submitted set.
    #[serde(default)]
    pub inventory: Option<Vec<InventoryLinePayload>>,
    /// Free-text comment.
    #[serde(default)]
    pub comments: Option<String>,
}

impl CompleteTaskRequest {
    /// Converts the wire payload into the service submission.
    #[must_use]
    pub fn into_submission(self) -> TaskSubmission {
        TaskSubmission {
            gps: self.gps_data.map(|gps| Coordinates::new(gps.lat, gps.lng)),
            inventory: self.inventory.map(|lines| {
                lines.into_iter().map(InventoryLinePayload::into_line).collect()
            }),
            comment: self.comments,
        }
    }
}

/// GPS coordinates as the clients send them.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GpsPayload {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// One inventory line as the clients send it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InventoryLinePayload {
    /// Counted product.
    pub producto_id: ProductId,
    /// Expected quantity.
    pub esperado: i32,
    /// Physically counted quantity.
    pub fisico: i32,
}

impl InventoryLinePayload {
    /// Converts the wire line into the domain type.
    #[must_use]
    pub const fn into_line(self) -> InventoryLine {
        InventoryLine {
            product_id: self.producto_id,
            expected: self.esperado,
            counted: self.fisico,
        }
    }
}

/// `audit-execution` request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditExecutionRequest {
    /// Task to review.
    pub task_id: TaskInstanceId,
    /// Decision to record.
    pub status: ReviewDecision,
    /// Reviewer note; required for rejections.
    #[serde(default)]
    pub note: Option<String>,
}

/// `cancel-task` request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTaskRequest {
    /// Task to cancel.
    pub task_id: TaskInstanceId,
    /// Cancellation reason.
    pub reason: String,
    /// Whether to also deactivate the recurring assignment.
    pub scope: CancelScope,
}

/// `mark-missed-tasks` request payload.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MarkMissedRequest {
    /// Sweep cutoff date; today in civil time when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// `send-push` request payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPushRequest {
    /// Recipient user.
    pub user_id: UserId,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Deep link opened on tap.
    #[serde(default)]
    pub url: Option<String>,
}
