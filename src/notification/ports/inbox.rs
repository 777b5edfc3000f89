//! Persistence contract for the internal inbox.

use crate::notification::domain::NotificationRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Inbox persistence contract. The out-of-scope UI reads and marks records;
/// this crate only appends them.
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`InboxError`] when the record cannot be persisted.
    async fn append(&self, record: NotificationRecord) -> Result<(), InboxError>;
}

/// Errors returned by inbox implementations.
#[derive(Debug, Clone, Error)]
pub enum InboxError {
    /// Persistence-layer failure.
    #[error("inbox persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl InboxError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
