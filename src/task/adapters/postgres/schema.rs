//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task-instance records, one row per scheduled occurrence.
    task_instances (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning tenant.
        tenant_id -> Uuid,
        /// Originating routine template.
        routine_id -> Uuid,
        /// Point of sale the task is executed at.
        pdv_id -> Uuid,
        /// Originating recurring assignment, if any.
        assignment_id -> Nullable<Uuid>,
        /// Scheduled calendar date.
        scheduled_date -> Date,
        /// Deadline time-of-day snapshot; end of day when null.
        deadline_time -> Nullable<Time>,
        /// Lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Audit review sub-state.
        #[max_length = 50]
        audit_status -> Varchar,
        /// Completion instant, stamped by the first completion only.
        completed_at -> Nullable<Timestamptz>,
        /// Completer identity.
        completed_by -> Nullable<Uuid>,
        /// Submitted latitude.
        gps_latitude -> Nullable<Float8>,
        /// Submitted longitude.
        gps_longitude -> Nullable<Float8>,
        /// Whether the submission fell inside the acceptance radius.
        gps_in_range -> Nullable<Bool>,
        /// Free-text submission comment.
        comment -> Nullable<Text>,
        /// Priority snapshot.
        #[max_length = 50]
        priority -> Varchar,
        /// Cancellation instant.
        cancelled_at -> Nullable<Timestamptz>,
        /// Cancelling administrator.
        cancelled_by -> Nullable<Uuid>,
        /// Cancellation reason.
        cancellation_reason -> Nullable<Text>,
        /// Latest reviewer.
        reviewed_by -> Nullable<Uuid>,
        /// Latest review instant.
        reviewed_at -> Nullable<Timestamptz>,
        /// Latest review note.
        review_note -> Nullable<Text>,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Routine templates; read-only to this crate.
    routines (id) {
        /// Routine identifier.
        id -> Uuid,
        /// Human-readable routine name.
        #[max_length = 255]
        name -> Varchar,
        /// Whether submissions must carry geofence-validated coordinates.
        gps_required -> Bool,
        /// Whether submissions must carry inventory rows.
        inventory_required -> Bool,
    }
}

diesel::table! {
    /// Points of sale; read-only to this crate.
    pdvs (id) {
        /// Point-of-sale identifier.
        id -> Uuid,
        /// Configured site latitude.
        latitude -> Nullable<Float8>,
        /// Configured site longitude.
        longitude -> Nullable<Float8>,
        /// Acceptance radius in meters.
        radius_meters -> Nullable<Float8>,
    }
}

diesel::table! {
    /// Inventory counts submitted with completed tasks.
    inventory_submissions (id) {
        /// Row identifier.
        id -> Uuid,
        /// Owning task instance.
        task_id -> Uuid,
        /// Counted product.
        product_id -> Uuid,
        /// Expected quantity.
        expected -> Int4,
        /// Physically counted quantity.
        counted -> Int4,
    }
}

diesel::table! {
    /// Recurring assignments that generate task occurrences.
    recurring_assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Whether the assignment still generates occurrences.
        active -> Bool,
        /// Free-text notes; deactivation reasons are appended here.
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    /// Append-only audit trail of privileged mutations.
    audit_log (id) {
        /// Entry identifier.
        id -> Uuid,
        /// User who performed the mutation.
        actor -> Uuid,
        /// Action performed.
        #[max_length = 100]
        action -> Varchar,
        /// Store table the mutation touched.
        #[max_length = 100]
        table_name -> Varchar,
        /// Identifier of the mutated record.
        record_id -> Uuid,
        /// JSON snapshot of the values written.
        new_values -> Jsonb,
        /// Append timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(task_instances -> routines (routine_id));
diesel::joinable!(task_instances -> pdvs (pdv_id));

diesel::allow_tables_to_appear_in_same_query!(task_instances, routines, pdvs);
