//! Task completion: geofence validation, deadline classification, and the
//! conditional persistence write.

use crate::access::AuthContext;
use crate::task::{
    domain::{
        CivilOffset, Coordinates, DeadlineVerdict, GpsResult, InventoryLine, Pdv, RoutineRules,
        TaskDomainError, TaskInstance, TaskInstanceId, TaskState, distance_meters, evaluate,
        within_radius,
    },
    ports::{
        CompletionApplied, CompletionTransition, CompletionWrite, TaskInstanceRepository,
        TaskStoreError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// One completion submission from a field user.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskSubmission {
    /// Captured device coordinates, when the client obtained a fix.
    pub gps: Option<Coordinates>,
    /// Inventory counts; replaces any previously submitted set wholesale.
    pub inventory: Option<Vec<InventoryLine>>,
    /// Free-text comment.
    pub comment: Option<String>,
}

/// Service-level errors for task completion.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskInstanceId),

    /// The task belongs to a tenant the caller may not act on.
    #[error("task {0} belongs to another tenant")]
    TenantMismatch(TaskInstanceId),

    /// A domain rule rejected the submission.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The store could not apply the submission.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for CompletionError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::NotFound(id),
            TaskStoreError::Domain(domain) => Self::Domain(domain),
            other => Self::Store(other),
        }
    }
}

/// Task completion orchestration service.
#[derive(Clone)]
pub struct CompletionService<R, C>
where
    R: TaskInstanceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    offset: CivilOffset,
}

impl<R, C> CompletionService<R, C>
where
    R: TaskInstanceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a completion service evaluating deadlines in `offset`.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, offset: CivilOffset) -> Self {
        Self {
            repository,
            clock,
            offset,
        }
    }

    /// Completes a task.
    ///
    /// Validates the geofence requirement, classifies the submission against
    /// the task's deadline while the task is still open, and persists the
    /// submission as one atomic unit. A re-submission of an already-completed
    /// task (after an audit rejection) updates the field values and reopens
    /// the audit sub-state without touching the original completion stamp.
    /// No notification is sent from this operation.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::NotFound`] for unknown tasks,
    /// [`CompletionError::TenantMismatch`] for cross-tenant access,
    /// [`CompletionError::Domain`] when the geofence or state rules reject
    /// the submission, and [`CompletionError::Store`] on persistence failure.
    pub async fn complete(
        &self,
        task_id: TaskInstanceId,
        actor: &AuthContext,
        submission: TaskSubmission,
    ) -> Result<CompletionApplied, CompletionError> {
        let context = self
            .repository
            .load_with_context(task_id)
            .await?
            .ok_or(CompletionError::NotFound(task_id))?;

        if !actor.may_access_tenant(context.task.tenant()) {
            return Err(CompletionError::TenantMismatch(task_id));
        }

        let gps = evaluate_geofence(&context.task, &context.routine, &context.pdv, submission.gps)?;

        if context.routine.inventory_required && submission.inventory.is_none() {
            return Err(TaskDomainError::MissingInventory(task_id).into());
        }

        let now = self.clock.utc();
        let transition = plan_transition(&context.task, actor, now, self.offset)?;

        let write = CompletionWrite {
            transition,
            gps,
            comment: submission.comment,
            inventory: submission.inventory,
            submitted_at: now,
        };
        Ok(self.repository.apply_completion(task_id, write).await?)
    }
}

/// Validates the geofence requirement and computes the GPS capture to
/// persist.
///
/// Mandatory GPS rejects the submission outright when coordinates are
/// missing, the site is not geolocated, or the fix falls outside the
/// acceptance radius. Optional GPS records the in-range flag
/// opportunistically and never blocks.
fn evaluate_geofence(
    task: &TaskInstance,
    routine: &RoutineRules,
    pdv: &Pdv,
    coordinates: Option<Coordinates>,
) -> Result<Option<GpsResult>, TaskDomainError> {
    let Some(fix) = coordinates else {
        if routine.gps_required {
            return Err(TaskDomainError::MissingCoordinates(task.id()));
        }
        return Ok(None);
    };

    let limit = pdv.effective_radius_meters();
    if routine.gps_required {
        let Some(site) = pdv.location else {
            return Err(TaskDomainError::PdvNotGeolocated(pdv.id));
        };
        let distance = distance_meters(fix, site);
        if !within_radius(distance, limit) {
            return Err(TaskDomainError::OutOfRange {
                distance_meters: distance,
                limit_meters: limit,
            });
        }
        return Ok(Some(GpsResult {
            latitude: fix.latitude,
            longitude: fix.longitude,
            in_range: true,
        }));
    }

    // Optional GPS: a site without coordinates cannot validate the fix, so
    // the capture is recorded as out of range.
    let in_range = pdv
        .location
        .is_some_and(|site| within_radius(distance_meters(fix, site), limit));
    Ok(Some(GpsResult {
        latitude: fix.latitude,
        longitude: fix.longitude,
        in_range,
    }))
}

/// Plans the conditional lifecycle transition for this submission.
///
/// Open tasks are classified against their deadline; already-completed tasks
/// keep their stamp (`None`); cancelled and missed tasks reject the
/// submission.
fn plan_transition(
    task: &TaskInstance,
    actor: &AuthContext,
    now: chrono::DateTime<chrono::Utc>,
    offset: CivilOffset,
) -> Result<Option<CompletionTransition>, TaskDomainError> {
    if task.state().is_completed() {
        return Ok(None);
    }
    if !task.state().is_open() {
        return Err(TaskDomainError::InvalidStateTransition {
            task_id: task.id(),
            from: task.state(),
            to: TaskState::CompletedOnTime,
        });
    }

    let verdict = evaluate(task.scheduled_date(), task.deadline_time(), offset, now);
    let state = match verdict {
        DeadlineVerdict::OnTime => TaskState::CompletedOnTime,
        DeadlineVerdict::Late => TaskState::CompletedLate,
    };
    Ok(Some(CompletionTransition {
        state,
        at: now,
        by: actor.user(),
    }))
}
