//! `PostgreSQL` append-only audit log.

use super::schema::audit_log;
use crate::task::ports::{AuditLogEntry, AuditLogError, AuditLogRecorder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use serde_json::Value;

/// Insert model for audit trail entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
struct NewAuditRow {
    id: uuid::Uuid,
    actor: uuid::Uuid,
    action: String,
    table_name: String,
    record_id: uuid::Uuid,
    new_values: Value,
    created_at: DateTime<Utc>,
}

/// `PostgreSQL`-backed audit log.
#[derive(Debug, Clone)]
pub struct PostgresAuditLog {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresAuditLog {
    /// Creates a new audit log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRecorder for PostgresAuditLog {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), AuditLogError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditLogError::persistence)?;
            let row = NewAuditRow {
                id: uuid::Uuid::new_v4(),
                actor: entry.actor.into_inner(),
                action: entry.action.as_str().to_owned(),
                table_name: entry.table_name,
                record_id: entry.record_id,
                new_values: entry.new_values,
                created_at: entry.at,
            };
            diesel::insert_into(audit_log::table)
                .values(&row)
                .execute(&mut connection)
                .map_err(AuditLogError::persistence)?;
            Ok(())
        })
        .await
        .map_err(AuditLogError::persistence)?
    }
}
