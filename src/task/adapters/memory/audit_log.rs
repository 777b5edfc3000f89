//! In-memory append-only audit log for tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::ports::{AuditLogEntry, AuditLogError, AuditLogRecorder};

/// Thread-safe in-memory audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl InMemoryAuditLog {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the appended entries, for test assertions.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditLogRecorder for InMemoryAuditLog {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditLogError> {
        let mut entries = self.entries.write().map_err(|err| {
            AuditLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        entries.push(entry);
        Ok(())
    }
}
