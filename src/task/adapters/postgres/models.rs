//! Diesel row models and domain conversions for task persistence.

use super::schema::{inventory_submissions, pdvs, routines, task_instances};
use crate::access::{TenantId, UserId};
use crate::task::{
    domain::{
        AssignmentId, AuditStatus, Cancellation, Coordinates, GpsResult, InventoryLine, Pdv,
        PdvId, PersistedTaskInstance, Priority, ProductId, ReviewRecord, RoutineId, RoutineRules,
        TaskInstance, TaskInstanceId, TaskState,
    },
    ports::{TaskStoreError, TaskStoreResult},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;

/// Query result row for task instances.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_instances)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskInstanceRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning tenant.
    pub tenant_id: uuid::Uuid,
    /// Originating routine template.
    pub routine_id: uuid::Uuid,
    /// Point of sale.
    pub pdv_id: uuid::Uuid,
    /// Originating recurring assignment, if any.
    pub assignment_id: Option<uuid::Uuid>,
    /// Scheduled calendar date.
    pub scheduled_date: NaiveDate,
    /// Deadline time-of-day snapshot.
    pub deadline_time: Option<NaiveTime>,
    /// Lifecycle state.
    pub state: String,
    /// Audit review sub-state.
    pub audit_status: String,
    /// Completion instant.
    pub completed_at: Option<DateTime<Utc>>,
    /// Completer identity.
    pub completed_by: Option<uuid::Uuid>,
    /// Submitted latitude.
    pub gps_latitude: Option<f64>,
    /// Submitted longitude.
    pub gps_longitude: Option<f64>,
    /// In-range flag.
    pub gps_in_range: Option<bool>,
    /// Submission comment.
    pub comment: Option<String>,
    /// Priority snapshot.
    pub priority: String,
    /// Cancellation instant.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Cancelling administrator.
    pub cancelled_by: Option<uuid::Uuid>,
    /// Cancellation reason.
    pub cancellation_reason: Option<String>,
    /// Latest reviewer.
    pub reviewed_by: Option<uuid::Uuid>,
    /// Latest review instant.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Latest review note.
    pub review_note: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for routine templates.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = routines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoutineRow {
    /// Routine identifier.
    pub id: uuid::Uuid,
    /// Routine name.
    pub name: String,
    /// GPS mandate flag.
    pub gps_required: bool,
    /// Inventory mandate flag.
    pub inventory_required: bool,
}

/// Query result row for points of sale.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pdvs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PdvRow {
    /// Point-of-sale identifier.
    pub id: uuid::Uuid,
    /// Site latitude.
    pub latitude: Option<f64>,
    /// Site longitude.
    pub longitude: Option<f64>,
    /// Acceptance radius in meters.
    pub radius_meters: Option<f64>,
}

/// Query result row for inventory submissions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inventory_submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InventoryRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Counted product.
    pub product_id: uuid::Uuid,
    /// Expected quantity.
    pub expected: i32,
    /// Counted quantity.
    pub counted: i32,
}

/// Insert model for inventory submissions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inventory_submissions)]
pub struct NewInventoryRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Counted product.
    pub product_id: uuid::Uuid,
    /// Expected quantity.
    pub expected: i32,
    /// Counted quantity.
    pub counted: i32,
}

impl NewInventoryRow {
    /// Builds an insert row for one submitted line.
    #[must_use]
    pub fn from_line(task_id: TaskInstanceId, line: &InventoryLine) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            task_id: task_id.into_inner(),
            product_id: line.product_id.into_inner(),
            expected: line.expected,
            counted: line.counted,
        }
    }
}

/// Converts a task row into the domain aggregate.
///
/// # Errors
///
/// Returns a persistence error when a stored state, status, or priority
/// value cannot be parsed.
pub fn row_to_task(row: TaskInstanceRow) -> TaskStoreResult<TaskInstance> {
    let state = TaskState::try_from(row.state.as_str()).map_err(TaskStoreError::persistence)?;
    let audit_status =
        AuditStatus::try_from(row.audit_status.as_str()).map_err(TaskStoreError::persistence)?;
    let priority =
        Priority::try_from(row.priority.as_str()).map_err(TaskStoreError::persistence)?;

    let gps = match (row.gps_latitude, row.gps_longitude, row.gps_in_range) {
        (Some(latitude), Some(longitude), Some(in_range)) => Some(GpsResult {
            latitude,
            longitude,
            in_range,
        }),
        _ => None,
    };
    let cancellation = match (row.cancelled_at, row.cancelled_by, row.cancellation_reason) {
        (Some(at), Some(by), Some(reason)) => Some(Cancellation {
            at,
            by: UserId::from_uuid(by),
            reason,
        }),
        _ => None,
    };
    let review = match (row.reviewed_by, row.reviewed_at) {
        (Some(reviewer), Some(at)) => Some(ReviewRecord {
            reviewer: UserId::from_uuid(reviewer),
            at,
            note: row.review_note,
        }),
        _ => None,
    };

    Ok(TaskInstance::from_persisted(PersistedTaskInstance {
        id: TaskInstanceId::from_uuid(row.id),
        tenant: TenantId::from_uuid(row.tenant_id),
        routine_id: RoutineId::from_uuid(row.routine_id),
        pdv_id: PdvId::from_uuid(row.pdv_id),
        assignment_id: row.assignment_id.map(AssignmentId::from_uuid),
        scheduled_date: row.scheduled_date,
        deadline_time: row.deadline_time,
        state,
        audit_status,
        completed_at: row.completed_at,
        completed_by: row.completed_by.map(UserId::from_uuid),
        gps,
        comment: row.comment,
        priority,
        cancellation,
        review,
        updated_at: row.updated_at,
    }))
}

/// Converts a routine row into the domain rules snapshot.
#[must_use]
pub fn row_to_routine(row: RoutineRow) -> RoutineRules {
    RoutineRules {
        id: RoutineId::from_uuid(row.id),
        name: row.name,
        gps_required: row.gps_required,
        inventory_required: row.inventory_required,
    }
}

/// Converts a point-of-sale row into the domain type.
#[must_use]
pub fn row_to_pdv(row: PdvRow) -> Pdv {
    let location = match (row.latitude, row.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
        _ => None,
    };
    Pdv {
        id: PdvId::from_uuid(row.id),
        location,
        radius_meters: row.radius_meters,
    }
}

/// Converts an inventory row into the domain line.
#[must_use]
pub const fn row_to_line(row: &InventoryRow) -> InventoryLine {
    InventoryLine {
        product_id: ProductId::from_uuid(row.product_id),
        expected: row.expected,
        counted: row.counted,
    }
}
