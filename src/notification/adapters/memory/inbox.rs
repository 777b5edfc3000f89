//! Thread-safe in-memory inbox.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::NotificationRecord,
    ports::{InboxError, NotificationInbox},
};

/// Thread-safe in-memory inbox.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInbox {
    records: Arc<RwLock<Vec<NotificationRecord>>>,
}

impl InMemoryInbox {
    /// Creates an empty inbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the appended records, for test assertions.
    #[must_use]
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationInbox for InMemoryInbox {
    async fn append(&self, record: NotificationRecord) -> Result<(), InboxError> {
        let mut records = self
            .records
            .write()
            .map_err(|err| InboxError::persistence(std::io::Error::other(err.to_string())))?;
        records.push(record);
        Ok(())
    }
}
