//! Thread-safe in-memory task repository.
//!
//! Every write operation mutates under a single write-lock acquisition,
//! which is this adapter's atomic unit: a concurrent caller observes either
//! none or all of an operation's effects.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::access::UserId;
use crate::task::{
    domain::{
        AssignmentId, InventoryLine, Pdv, PdvId, RoutineId, RoutineRules, TaskInstance,
        TaskInstanceId, TaskState,
    },
    ports::{
        CompletionApplied, CompletionContext, CompletionWrite, ReviewWrite, SweepScope,
        TaskInstanceRepository, TaskStoreError, TaskStoreResult,
    },
};

/// Recurring assignment row as stored by this adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAssignment {
    /// Whether the assignment still generates occurrences.
    pub active: bool,
    /// Free-text notes; deactivation reasons are appended here.
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
struct Store {
    tasks: HashMap<TaskInstanceId, TaskInstance>,
    routines: HashMap<RoutineId, RoutineRules>,
    pdvs: HashMap<PdvId, Pdv>,
    inventory: HashMap<TaskInstanceId, Vec<InventoryLine>>,
    assignments: HashMap<AssignmentId, StoredAssignment>,
}

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<Store>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a task instance.
    pub fn insert_task(&self, task: TaskInstance) {
        if let Ok(mut store) = self.state.write() {
            store.tasks.insert(task.id(), task);
        }
    }

    /// Seeds a routine rules snapshot.
    pub fn insert_routine(&self, routine: RoutineRules) {
        if let Ok(mut store) = self.state.write() {
            store.routines.insert(routine.id, routine);
        }
    }

    /// Seeds a point of sale.
    pub fn insert_pdv(&self, pdv: Pdv) {
        if let Ok(mut store) = self.state.write() {
            store.pdvs.insert(pdv.id, pdv);
        }
    }

    /// Seeds a recurring assignment.
    pub fn insert_assignment(&self, id: AssignmentId, assignment: StoredAssignment) {
        if let Ok(mut store) = self.state.write() {
            store.assignments.insert(id, assignment);
        }
    }

    /// Returns a seeded assignment's current row, for test assertions.
    #[must_use]
    pub fn assignment(&self, id: AssignmentId) -> Option<StoredAssignment> {
        self.state
            .read()
            .ok()
            .and_then(|store| store.assignments.get(&id).cloned())
    }

    fn write_lock(&self) -> TaskStoreResult<std::sync::RwLockWriteGuard<'_, Store>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn read_lock(&self) -> TaskStoreResult<std::sync::RwLockReadGuard<'_, Store>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

fn integrity_error(message: String) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(message))
}

#[async_trait]
impl TaskInstanceRepository for InMemoryTaskRepository {
    async fn find_by_id(&self, id: TaskInstanceId) -> TaskStoreResult<Option<TaskInstance>> {
        let store = self.read_lock()?;
        Ok(store.tasks.get(&id).cloned())
    }

    async fn load_with_context(
        &self,
        id: TaskInstanceId,
    ) -> TaskStoreResult<Option<CompletionContext>> {
        let store = self.read_lock()?;
        let Some(task) = store.tasks.get(&id).cloned() else {
            return Ok(None);
        };
        let routine = store
            .routines
            .get(&task.routine_id())
            .cloned()
            .ok_or_else(|| integrity_error(format!("routine missing for task {id}")))?;
        let pdv = store
            .pdvs
            .get(&task.pdv_id())
            .cloned()
            .ok_or_else(|| integrity_error(format!("point of sale missing for task {id}")))?;
        Ok(Some(CompletionContext { task, routine, pdv }))
    }

    async fn apply_completion(
        &self,
        id: TaskInstanceId,
        write: CompletionWrite,
    ) -> TaskStoreResult<CompletionApplied> {
        let mut store = self.write_lock()?;
        let mut task = store
            .tasks
            .get(&id)
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))?;

        let transitioned = write
            .transition
            .is_some_and(|transition| task.try_complete(transition.state, transition.at, transition.by));
        task.record_submission_fields(write.gps, write.comment, write.submitted_at);

        if let Some(lines) = write.inventory {
            store.inventory.insert(id, lines);
        }
        store.tasks.insert(id, task.clone());
        Ok(CompletionApplied { task, transitioned })
    }

    async fn apply_review(
        &self,
        id: TaskInstanceId,
        write: ReviewWrite,
    ) -> TaskStoreResult<TaskInstance> {
        let mut store = self.write_lock()?;
        let mut task = store
            .tasks
            .get(&id)
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))?;
        task.record_review(write.status, write.reviewer, write.note, write.at)?;
        store.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn apply_cancellation(
        &self,
        id: TaskInstanceId,
        by: UserId,
        reason: String,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<TaskInstance> {
        let mut store = self.write_lock()?;
        let mut task = store
            .tasks
            .get(&id)
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))?;
        task.cancel(by, reason, at)?;
        store.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn deactivate_assignment(
        &self,
        id: AssignmentId,
        reason: &str,
    ) -> TaskStoreResult<()> {
        let mut store = self.write_lock()?;
        let assignment = store
            .assignments
            .get_mut(&id)
            .ok_or(TaskStoreError::AssignmentNotFound(id))?;
        assignment.active = false;
        assignment.notes = Some(match assignment.notes.take() {
            Some(notes) => format!("{notes}\n{reason}"),
            None => reason.to_owned(),
        });
        Ok(())
    }

    async fn sweep_missed(
        &self,
        cutoff: NaiveDate,
        scope: SweepScope,
        at: DateTime<Utc>,
    ) -> TaskStoreResult<u64> {
        let mut store = self.write_lock()?;
        let mut updated: u64 = 0;
        for task in store.tasks.values_mut() {
            if task.state() != TaskState::Pending || task.scheduled_date() > cutoff {
                continue;
            }
            if let SweepScope::Tenant(tenant) = scope {
                if task.tenant() != tenant {
                    continue;
                }
            }
            if task.mark_missed(at) {
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn inventory_for(&self, id: TaskInstanceId) -> TaskStoreResult<Vec<InventoryLine>> {
        let store = self.read_lock()?;
        Ok(store.inventory.get(&id).cloned().unwrap_or_default())
    }
}
