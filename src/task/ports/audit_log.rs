//! Append-only audit trail of privileged mutations.

use crate::access::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Privileged actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// A task instance was cancelled.
    TaskCancelled,
    /// A recurring assignment was deactivated.
    AssignmentDeactivated,
}

impl AuditAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCancelled => "cancel_task",
            Self::AssignmentDeactivated => "deactivate_assignment",
        }
    }
}

/// Immutable record of one privileged mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    /// User who performed the mutation.
    pub actor: UserId,
    /// What was done.
    pub action: AuditAction,
    /// Store table the mutation touched.
    pub table_name: String,
    /// Identifier of the mutated record.
    pub record_id: Uuid,
    /// JSON snapshot of the values written.
    pub new_values: Value,
    /// Instant the mutation was recorded.
    pub at: DateTime<Utc>,
}

/// Append-only audit log contract.
#[async_trait]
pub trait AuditLogRecorder: Send + Sync {
    /// Appends one entry to the trail.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError`] when the entry cannot be persisted.
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditLogError>;
}

/// Errors returned by audit log implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditLogError {
    /// Persistence-layer failure.
    #[error("audit log persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
