//! Response projection of a leave request.

use crate::leave::domain::{
    LeaveId, LeaveRequest, LeaveStatus, LeaveType, Team, UserId, UserProfile,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Leave request as returned to callers, with owner and team names
/// denormalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveView {
    /// Leave request identifier.
    pub id: LeaveId,
    /// Owning user.
    pub user_id: UserId,
    /// Owner display name, empty when unknown.
    pub user_name: String,
    /// Owner team name, empty when the owner has no team.
    pub team_name: String,
    /// Leave category.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// Approval status.
    pub status: LeaveStatus,
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
}

impl LeaveView {
    /// Projects `leave` using the owner's directory entry and team.
    #[must_use]
    pub fn project(leave: &LeaveRequest, owner: Option<&UserProfile>, team: Option<&Team>) -> Self {
        Self {
            id: leave.id(),
            user_id: leave.user_id(),
            user_name: owner.map(|user| user.name.clone()).unwrap_or_default(),
            team_name: team.map(|found| found.name.clone()).unwrap_or_default(),
            leave_type: leave.leave_type(),
            status: leave.status(),
            start_date: leave.interval().start(),
            end_date: leave.interval().end(),
            reason: leave.reason().as_str().to_owned(),
            manager_comment: leave.manager_comment().map(str::to_owned),
            created_at: leave.created_at(),
            updated_at: leave.updated_at(),
        }
    }
}
