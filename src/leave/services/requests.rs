//! Request payloads accepted by the leave workflow.
//!
//! Each payload deserializes from the camelCase JSON an HTTP layer receives,
//! and offers builder methods for programmatic callers.

use crate::leave::domain::{FieldSet, LeaveField, LeaveStatus, LeaveType, TeamId, UserId};
use chrono::NaiveDate;
use serde::Deserialize;

/// Payload for filing a new leave request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    #[serde(rename = "type")]
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
}

impl CreateLeaveRequest {
    /// Creates a request with every required field.
    #[must_use]
    pub fn new(
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            leave_type,
            start_date,
            end_date,
            reason: reason.into(),
        }
    }

    pub(crate) fn into_parts(self) -> (LeaveType, NaiveDate, NaiveDate, String) {
        (self.leave_type, self.start_date, self.end_date, self.reason)
    }
}

/// Partial update of a leave request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeavePatch {
    #[serde(rename = "type")]
    pub(crate) leave_type: Option<LeaveType>,
    pub(crate) start_date: Option<NaiveDate>,
    pub(crate) end_date: Option<NaiveDate>,
    pub(crate) reason: Option<String>,
    pub(crate) status: Option<LeaveStatus>,
    pub(crate) manager_comment: Option<String>,
}

impl LeavePatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the leave type.
    #[must_use]
    pub const fn with_leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = Some(leave_type);
        self
    }

    /// Sets the first day.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Sets the last day.
    #[must_use]
    pub const fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: LeaveStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the approver comment.
    #[must_use]
    pub fn with_manager_comment(mut self, comment: impl Into<String>) -> Self {
        self.manager_comment = Some(comment.into());
        self
    }

    /// Fields present in the patch.
    #[must_use]
    pub fn fields(&self) -> FieldSet {
        [
            (LeaveField::Type, self.leave_type.is_some()),
            (LeaveField::StartDate, self.start_date.is_some()),
            (LeaveField::EndDate, self.end_date.is_some()),
            (LeaveField::Reason, self.reason.is_some()),
            (LeaveField::Status, self.status.is_some()),
            (LeaveField::ManagerComment, self.manager_comment.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }

    /// Returns `true` when the patch changes either date.
    #[must_use]
    pub const fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Filters for listing leave requests. Every populated filter must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaveListQuery {
    pub(crate) user_id: Option<UserId>,
    pub(crate) team_id: Option<TeamId>,
    pub(crate) status: Option<LeaveStatus>,
    #[serde(rename = "type")]
    pub(crate) leave_type: Option<LeaveType>,
    pub(crate) from: Option<NaiveDate>,
    pub(crate) to: Option<NaiveDate>,
}

impl LeaveListQuery {
    /// Creates a query without filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one owner. Ignored for employees, whose scope is
    /// already limited to their own requests.
    #[must_use]
    pub const fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Restricts to members of a team.
    #[must_use]
    pub const fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Restricts to a status.
    #[must_use]
    pub const fn with_status(mut self, status: LeaveStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to a leave type.
    #[must_use]
    pub const fn with_leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = Some(leave_type);
        self
    }

    /// Restricts to requests ending on or after `from`.
    #[must_use]
    pub const fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    /// Restricts to requests starting on or before `to`.
    #[must_use]
    pub const fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }
}
