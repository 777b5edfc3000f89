//! `PostgreSQL` repository implementation for task lifecycle storage.
//!
//! Every write operation runs inside one transaction, and the lifecycle
//! guards are expressed in the `UPDATE` predicates themselves: the
//! pending→completed transition and the cancellation both match only rows
//! still in an open state, so concurrent submissions cannot lose updates to
//! a read-then-write window.

use super::{
    models::{
        NewInventoryRow, PdvRow, RoutineRow, TaskInstanceRow, row_to_line, row_to_pdv,
        row_to_routine, row_to_task,
    },
    schema::{inventory_submissions, pdvs, recurring_assignments, routines, task_instances},
};
use crate::access::UserId;
use crate::task::{
    domain::{
        AssignmentId, AuditStatus, InventoryLine, TaskDomainError, TaskInstance, TaskInstanceId,
        TaskState,
    },
    ports::{
        CompletionApplied, CompletionContext, CompletionTransition, CompletionWrite, ReviewWrite,
        SweepScope, TaskInstanceRepository, TaskStoreError, TaskStoreResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// States that still accept a completion submission, in storage form.
const OPEN_STATES: [&str; 2] = [
    TaskState::Pending.as_str(),
    TaskState::InProgress.as_str(),
];

/// Completed states, in storage form.
const COMPLETED_STATES: [&str; 2] = [
    TaskState::CompletedOnTime.as_str(),
    TaskState::CompletedLate.as_str(),
];

impl From<DieselError> for TaskStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskInstanceRepository for PostgresTaskRepository {
    async fn find_by_id(&self, id: TaskInstanceId) -> TaskStoreResult<Option<TaskInstance>> {
        self.run_blocking(move |connection| {
            load_task_row(connection, id)?.map(row_to_task).transpose()
        })
        .await
    }

    async fn load_with_context(
        &self,
        id: TaskInstanceId,
    ) -> TaskStoreResult<Option<CompletionContext>> {
        self.run_blocking(move |connection| {
            let joined = task_instances::table
                .inner_join(routines::table)
                .inner_join(pdvs::table)
                .filter(task_instances::id.eq(id.into_inner()))
                .select((
                    TaskInstanceRow::as_select(),
                    RoutineRow::as_select(),
                    PdvRow::as_select(),
                ))
                .first::<(TaskInstanceRow, RoutineRow, PdvRow)>(connection)
                .optional()?;

            joined
                .map(|(task_row, routine_row, pdv_row)| {
                    Ok(CompletionContext {
                        task: row_to_task(task_row)?,
                        routine: row_to_routine(routine_row),
                        pdv: row_to_pdv(pdv_row),
                    })
                })
                .transpose()
        })
        .await
    }

    async fn apply_completion(
        &self,
        id: TaskInstanceId,
        write: CompletionWrite,
    ) -> TaskStoreResult<CompletionApplied> {
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                let transitioned = write
                    .transition
                    .map(|transition| apply_transition(connection, id, transition))
                    .transpose()?
                    .unwrap_or(false);

                let touched = apply_submission_fields(connection, id, &write)?;
                if touched == 0 {
                    return Err(TaskStoreError::NotFound(id));
                }
                reopen_rejected_audit(connection, id)?;

                if let Some(lines) = &write.inventory {
                    replace_inventory(connection, id, lines)?;
                }

                let row = load_task_row(connection, id)?.ok_or(TaskStoreError::NotFound(id))?;
                Ok(CompletionApplied {
                    task: row_to_task(row)?,
                    transitioned,
                })
            })
        })
        .await
    }

    async fn apply_review(
        &self,
        id: TaskInstanceId,
        write: ReviewWrite,
    ) -> TaskStoreResult<TaskInstance> {
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                let affected = diesel::update(
                    task_instances::table
                        .filter(task_instances::id.eq(id.into_inner()))
                        .filter(task_instances::state.eq_any(COMPLETED_STATES)),
                )
                .set((
                    task_instances::audit_status.eq(write.status.as_str()),
                    task_instances::reviewed_by.eq(write.reviewer.into_inner()),
                    task_instances::reviewed_at.eq(write.at),
                    task_instances::review_note.eq(write.note.clone()),
                    task_instances::updated_at.eq(write.at),
                ))
                .execute(connection)?;

                if affected == 0 {
                    let row = load_task_row(connection, id)?;
                    return match row {
                        None => Err(TaskStoreError::NotFound(id)),
                        Some(_) => Err(TaskDomainError::NotCompleted(id).into()),
                    };
                }

                let row = load_task_row(connection, id)?.ok_or(TaskStoreError::NotFound(id))?;
                row_to_task(row)
            })
        })
        .await
    }

    async fn apply_cancellation(
        &self,
        id: TaskInstanceId,
        by: UserId,
        reason: String,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<TaskInstance> {
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                let affected = diesel::update(
                    task_instances::table
                        .filter(task_instances::id.eq(id.into_inner()))
                        .filter(task_instances::state.eq_any(OPEN_STATES)),
                )
                .set((
                    task_instances::state.eq(TaskState::Cancelled.as_str()),
                    task_instances::cancelled_at.eq(at),
                    task_instances::cancelled_by.eq(by.into_inner()),
                    task_instances::cancellation_reason.eq(reason.clone()),
                    task_instances::updated_at.eq(at),
                ))
                .execute(connection)?;

                if affected == 0 {
                    return Err(cancellation_conflict(connection, id)?);
                }

                let row = load_task_row(connection, id)?.ok_or(TaskStoreError::NotFound(id))?;
                row_to_task(row)
            })
        })
        .await
    }

    async fn deactivate_assignment(
        &self,
        id: AssignmentId,
        reason: &str,
    ) -> TaskStoreResult<()> {
        let reason = reason.to_owned();
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                let notes = recurring_assignments::table
                    .filter(recurring_assignments::id.eq(id.into_inner()))
                    .select(recurring_assignments::notes)
                    .first::<Option<String>>(connection)
                    .optional()?
                    .ok_or(TaskStoreError::AssignmentNotFound(id))?;

                let appended = notes.map_or_else(
                    || reason.clone(),
                    |existing| format!("{existing}\n{reason}"),
                );
                diesel::update(
                    recurring_assignments::table
                        .filter(recurring_assignments::id.eq(id.into_inner())),
                )
                .set((
                    recurring_assignments::active.eq(false),
                    recurring_assignments::notes.eq(appended),
                ))
                .execute(connection)?;
                Ok(())
            })
        })
        .await
    }

    async fn sweep_missed(
        &self,
        cutoff: NaiveDate,
        scope: SweepScope,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<u64> {
        self.run_blocking(move |connection| {
            let affected = match scope {
                SweepScope::Tenant(tenant) => diesel::update(
                    task_instances::table
                        .filter(task_instances::state.eq(TaskState::Pending.as_str()))
                        .filter(task_instances::scheduled_date.le(cutoff))
                        .filter(task_instances::tenant_id.eq(tenant.into_inner())),
                )
                .set((
                    task_instances::state.eq(TaskState::Missed.as_str()),
                    task_instances::updated_at.eq(at),
                ))
                .execute(connection)?,
                SweepScope::AllTenants => diesel::update(
                    task_instances::table
                        .filter(task_instances::state.eq(TaskState::Pending.as_str()))
                        .filter(task_instances::scheduled_date.le(cutoff)),
                )
                .set((
                    task_instances::state.eq(TaskState::Missed.as_str()),
                    task_instances::updated_at.eq(at),
                ))
                .execute(connection)?,
            };
            u64::try_from(affected).map_err(TaskStoreError::persistence)
        })
        .await
    }

    async fn inventory_for(&self, id: TaskInstanceId) -> TaskStoreResult<Vec<InventoryLine>> {
        self.run_blocking(move |connection| {
            let rows = inventory_submissions::table
                .filter(inventory_submissions::task_id.eq(id.into_inner()))
                .select(super::models::InventoryRow::as_select())
                .load::<super::models::InventoryRow>(connection)?;
            Ok(rows.iter().map(row_to_line).collect())
        })
        .await
    }
}

fn load_task_row(
    connection: &mut PgConnection,
    id: TaskInstanceId,
) -> TaskStoreResult<Option<TaskInstanceRow>> {
    Ok(task_instances::table
        .filter(task_instances::id.eq(id.into_inner()))
        .select(TaskInstanceRow::as_select())
        .first::<TaskInstanceRow>(connection)
        .optional()?)
}

/// Applies the conditional lifecycle transition; matches only rows still in
/// an open state and reports whether a row was updated.
fn apply_transition(
    connection: &mut PgConnection,
    id: TaskInstanceId,
    transition: CompletionTransition,
) -> TaskStoreResult<bool> {
    let affected = diesel::update(
        task_instances::table
            .filter(task_instances::id.eq(id.into_inner()))
            .filter(task_instances::state.eq_any(OPEN_STATES)),
    )
    .set((
        task_instances::state.eq(transition.state.as_str()),
        task_instances::completed_at.eq(transition.at),
        task_instances::completed_by.eq(transition.by.into_inner()),
        task_instances::audit_status.eq(AuditStatus::Unreviewed.as_str()),
        task_instances::updated_at.eq(transition.at),
    ))
    .execute(connection)?;
    Ok(affected > 0)
}

/// Changeset for the unconditional submission fields; absent options leave
/// their columns untouched.
#[derive(AsChangeset)]
#[diesel(table_name = task_instances)]
struct SubmissionChangeset {
    gps_latitude: Option<f64>,
    gps_longitude: Option<f64>,
    gps_in_range: Option<bool>,
    comment: Option<String>,
    updated_at: DateTime<Utc>,
}

fn apply_submission_fields(
    connection: &mut PgConnection,
    id: TaskInstanceId,
    write: &CompletionWrite,
) -> TaskStoreResult<usize> {
    let changeset = SubmissionChangeset {
        gps_latitude: write.gps.map(|gps| gps.latitude),
        gps_longitude: write.gps.map(|gps| gps.longitude),
        gps_in_range: write.gps.map(|gps| gps.in_range),
        comment: write.comment.clone(),
        updated_at: write.submitted_at,
    };
    Ok(
        diesel::update(task_instances::table.filter(task_instances::id.eq(id.into_inner())))
            .set(changeset)
            .execute(connection)?,
    )
}

/// Reopens a rejected audit for re-review, clearing the stale review stamp.
fn reopen_rejected_audit(
    connection: &mut PgConnection,
    id: TaskInstanceId,
) -> TaskStoreResult<usize> {
    Ok(diesel::update(
        task_instances::table
            .filter(task_instances::id.eq(id.into_inner()))
            .filter(task_instances::audit_status.eq(AuditStatus::Rejected.as_str())),
    )
    .set((
        task_instances::audit_status.eq(AuditStatus::Unreviewed.as_str()),
        task_instances::reviewed_by.eq(None::<uuid::Uuid>),
        task_instances::reviewed_at.eq(None::<DateTime<Utc>>),
        task_instances::review_note.eq(None::<String>),
    ))
    .execute(connection)?)
}

fn replace_inventory(
    connection: &mut PgConnection,
    id: TaskInstanceId,
    lines: &[InventoryLine],
) -> TaskStoreResult<()> {
    diesel::delete(
        inventory_submissions::table.filter(inventory_submissions::task_id.eq(id.into_inner())),
    )
    .execute(connection)?;
    let rows: Vec<NewInventoryRow> = lines
        .iter()
        .map(|line| NewInventoryRow::from_line(id, line))
        .collect();
    diesel::insert_into(inventory_submissions::table)
        .values(&rows)
        .execute(connection)?;
    Ok(())
}

/// Builds the precise error for a cancellation whose conditional update
/// matched no row.
fn cancellation_conflict(
    connection: &mut PgConnection,
    id: TaskInstanceId,
) -> TaskStoreResult<TaskStoreError> {
    let Some(row) = load_task_row(connection, id)? else {
        return Ok(TaskStoreError::NotFound(id));
    };
    let state = TaskState::try_from(row.state.as_str()).map_err(TaskStoreError::persistence)?;
    if state.is_completed() {
        return Ok(TaskDomainError::CompletedTaskCancellation(id).into());
    }
    Ok(TaskDomainError::InvalidStateTransition {
        task_id: id,
        from: state,
        to: TaskState::Cancelled,
    }
    .into())
}
