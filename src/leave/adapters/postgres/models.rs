//! Diesel row models for leave persistence and directory lookups.

use super::schema::{leave_requests, teams, users};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for leave requests.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = leave_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LeaveRow {
    /// Leave request identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Leave category.
    pub leave_type: String,
    /// Approval status.
    pub status: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Free-text justification.
    pub reason: String,
    /// Approver comment.
    pub manager_comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter.
    pub version: i64,
}

/// Insert model for leave requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = leave_requests)]
pub struct NewLeaveRow {
    /// Leave request identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Leave category.
    pub leave_type: String,
    /// Approval status.
    pub status: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Free-text justification.
    pub reason: String,
    /// Approver comment.
    pub manager_comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter.
    pub version: i64,
}

/// Update model for leave requests. Owner and creation time never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = leave_requests)]
#[diesel(treat_none_as_null = true)]
pub struct LeaveChangeset {
    /// Leave category.
    pub leave_type: String,
    /// Approval status.
    pub status: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Free-text justification.
    pub reason: String,
    /// Approver comment.
    pub manager_comment: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter.
    pub version: i64,
}

/// Query result row for users.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Role name.
    pub role: String,
    /// Team membership.
    pub team_id: Option<uuid::Uuid>,
}

/// Query result row for teams.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamRow {
    /// Team identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
}
