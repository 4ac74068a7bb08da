//! Diesel schema for leave persistence and the read-only directory tables.

diesel::table! {
    /// Leave requests.
    leave_requests (id) {
        /// Leave request identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Leave category.
        #[max_length = 20]
        leave_type -> Varchar,
        /// Approval status.
        #[max_length = 20]
        status -> Varchar,
        /// First day of leave, inclusive.
        start_date -> Date,
        /// Last day of leave, inclusive.
        end_date -> Date,
        /// Free-text justification.
        reason -> Text,
        /// Approver comment.
        manager_comment -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Optimistic concurrency counter.
        version -> Int8,
    }
}

diesel::table! {
    /// Teams, owned by the user management service.
    teams (id) {
        /// Team identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Users, owned by the user management service.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Role in the approval hierarchy.
        #[max_length = 20]
        role -> Varchar,
        /// Team membership.
        team_id -> Nullable<Uuid>,
    }
}
