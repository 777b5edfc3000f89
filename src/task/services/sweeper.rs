//! Set-based closure of overdue pending tasks.

use crate::access::AuthContext;
use crate::task::{
    domain::CivilOffset,
    ports::{SweepScope, TaskInstanceRepository, TaskStoreError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for the missed-task sweep.
#[derive(Debug, Clone, Error)]
pub enum SweepError {
    /// The store could not run the sweep.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Number of tasks transitioned to `missed`.
    pub updated: u64,
    /// Cutoff date the sweep matched against.
    pub cutoff: NaiveDate,
    /// Tenant scope the sweep ran under.
    pub scope: SweepScope,
}

/// Missed-task sweeper service.
#[derive(Clone)]
pub struct SweeperService<R, C>
where
    R: TaskInstanceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    offset: CivilOffset,
}

impl<R, C> SweeperService<R, C>
where
    R: TaskInstanceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a sweeper service resolving "today" in `offset`.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, offset: CivilOffset) -> Self {
        Self {
            repository,
            clock,
            offset,
        }
    }

    /// Transitions every overdue pending task to `missed`.
    ///
    /// The cutoff defaults to today in the civil offset. The scope is derived
    /// from the caller: system credentials sweep every tenant, any other
    /// authenticated caller is restricted to their own. The underlying store
    /// statement matches only `pending` rows, which makes a repeated run for
    /// the same cutoff a zero-update no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Store`] when the bulk update cannot be executed.
    pub async fn sweep(
        &self,
        actor: &AuthContext,
        target_date: Option<NaiveDate>,
    ) -> Result<SweepOutcome, SweepError> {
        let now = self.clock.utc();
        let cutoff = target_date.unwrap_or_else(|| self.offset.civil_date_of(now));
        let scope = if actor.role().sweeps_all_tenants() {
            SweepScope::AllTenants
        } else {
            SweepScope::Tenant(actor.tenant())
        };

        let updated = self.repository.sweep_missed(cutoff, scope, now).await?;
        Ok(SweepOutcome {
            updated,
            cutoff,
            scope,
        })
    }
}
