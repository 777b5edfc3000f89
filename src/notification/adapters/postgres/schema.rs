//! Diesel schema for notification persistence.

diesel::table! {
    /// Registered push endpoints, one row per device registration.
    push_subscriptions (id) {
        /// Subscription identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Delivery endpoint URL.
        endpoint -> Text,
        /// Client public key (P-256 ECDH).
        p256dh -> Text,
        /// Client authentication secret.
        auth -> Text,
        /// Instant of the last successful delivery.
        last_used_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Internal inbox records consumed by the UI.
    notifications (id) {
        /// Record identifier.
        id -> Uuid,
        /// Recipient user.
        user_id -> Uuid,
        /// Record category.
        #[max_length = 100]
        kind -> Varchar,
        /// Rendered title.
        title -> Text,
        /// Task the record refers to, if any.
        task_id -> Nullable<Uuid>,
        /// Whether the user has opened the record.
        read -> Bool,
        /// Creation instant.
        created_at -> Timestamptz,
    }
}
