//! `PostgreSQL` adapters for task lifecycle persistence.

mod audit_log;
mod models;
mod repository;
mod schema;

pub use audit_log::PostgresAuditLog;
pub use repository::{PostgresTaskRepository, TaskPgPool};
