//! `PostgreSQL` implementations of the notification ports.

use super::{
    models::{NewNotificationRow, SubscriptionRow},
    schema::{notifications, push_subscriptions},
};
use crate::access::UserId;
use crate::notification::{
    domain::{NotificationRecord, PushSubscription, SubscriptionId},
    ports::{
        InboxError, NotificationInbox, PushSubscriptionRepository, SubscriptionStoreError,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by notification adapters.
type PgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed subscription store.
#[derive(Debug, Clone)]
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T, SubscriptionStoreError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, SubscriptionStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SubscriptionStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SubscriptionStoreError::persistence)?
    }
}

#[async_trait]
impl PushSubscriptionRepository for PostgresSubscriptionStore {
    async fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<PushSubscription>, SubscriptionStoreError> {
        self.run_blocking(move |connection| {
            let rows = push_subscriptions::table
                .filter(push_subscriptions::user_id.eq(user.into_inner()))
                .select(SubscriptionRow::as_select())
                .load::<SubscriptionRow>(connection)
                .map_err(SubscriptionStoreError::persistence)?;
            Ok(rows.into_iter().map(SubscriptionRow::into_domain).collect())
        })
        .await
    }

    async fn mark_used(
        &self,
        id: SubscriptionId,
        at: DateTime<Utc>,
    ) -> Result<(), SubscriptionStoreError> {
        self.run_blocking(move |connection| {
            diesel::update(
                push_subscriptions::table.filter(push_subscriptions::id.eq(id.into_inner())),
            )
            .set(push_subscriptions::last_used_at.eq(at))
            .execute(connection)
            .map_err(SubscriptionStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, id: SubscriptionId) -> Result<(), SubscriptionStoreError> {
        self.run_blocking(move |connection| {
            diesel::delete(
                push_subscriptions::table.filter(push_subscriptions::id.eq(id.into_inner())),
            )
            .execute(connection)
            .map_err(SubscriptionStoreError::persistence)?;
            Ok(())
        })
        .await
    }
}

/// `PostgreSQL`-backed inbox.
#[derive(Debug, Clone)]
pub struct PostgresInbox {
    pool: PgPool,
}

impl PostgresInbox {
    /// Creates a new inbox from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationInbox for PostgresInbox {
    async fn append(&self, record: NotificationRecord) -> Result<(), InboxError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(InboxError::persistence)?;
            let row = NewNotificationRow::from_record(record);
            diesel::insert_into(notifications::table)
                .values(&row)
                .execute(&mut connection)
                .map_err(InboxError::persistence)?;
            Ok(())
        })
        .await
        .map_err(InboxError::persistence)?
    }
}
