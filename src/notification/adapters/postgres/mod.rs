//! `PostgreSQL` adapters for notification persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresInbox, PostgresSubscriptionStore};
