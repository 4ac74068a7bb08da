//! Leave request aggregate root and its approval state machine.

use super::{
    LeaveDomainError, LeaveId, LeaveInterval, LeaveReason, ParseLeaveStatusError,
    ParseLeaveTypeError, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum LeaveType {
    /// Planned time off.
    Vacation,
    /// Illness.
    Sick,
    /// Personal matters.
    Personal,
}

impl LeaveType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vacation => "vacation",
            Self::Sick => "sick",
            Self::Personal => "personal",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LeaveType {
    type Error = ParseLeaveTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "vacation" => Ok(Self::Vacation),
            "sick" => Ok(Self::Sick),
            "personal" => Ok(Self::Personal),
            _ => Err(ParseLeaveTypeError(value.to_owned())),
        }
    }
}

impl TryFrom<String> for LeaveType {
    type Error = ParseLeaveTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Approval status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum LeaveStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved by a manager or HR.
    Approved,
    /// Rejected by a manager or HR.
    Rejected,
}

impl LeaveStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` when no further decision is expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Returns `true` when the approval state machine allows moving from
    /// `self` to `target`.
    ///
    /// Only a pending request can be decided. HR overrides bypass this check.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Rejected)
        )
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LeaveStatus {
    type Error = ParseLeaveStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseLeaveStatusError(value.to_owned())),
        }
    }
}

/// Accepts any casing, so `APPROVED` and `approved` both parse.
impl TryFrom<String> for LeaveStatus {
    type Error = ParseLeaveStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Content changes applied to an existing request.
///
/// Authorization of each field happens before a revision is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveRevision {
    /// Replacement leave type.
    pub leave_type: Option<LeaveType>,
    /// Replacement interval.
    pub interval: Option<LeaveInterval>,
    /// Replacement reason.
    pub reason: Option<LeaveReason>,
    /// Replacement approver comment.
    pub manager_comment: Option<String>,
}

/// Leave request aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    id: LeaveId,
    user_id: UserId,
    leave_type: LeaveType,
    status: LeaveStatus,
    interval: LeaveInterval,
    reason: LeaveReason,
    manager_comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u32,
}

/// Parameter object for reconstructing a persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedLeaveData {
    /// Persisted identifier.
    pub id: LeaveId,
    /// Owning user.
    pub user_id: UserId,
    /// Persisted leave type.
    pub leave_type: LeaveType,
    /// Persisted status.
    pub status: LeaveStatus,
    /// Persisted date interval.
    pub interval: LeaveInterval,
    /// Persisted reason.
    pub reason: LeaveReason,
    /// Persisted approver comment.
    pub manager_comment: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Number of successful writes, starting at 1.
    pub version: u32,
}

impl LeaveRequest {
    /// Files a new pending request owned by `user_id`.
    #[must_use]
    pub fn submit(
        user_id: UserId,
        leave_type: LeaveType,
        interval: LeaveInterval,
        reason: LeaveReason,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: LeaveId::new(),
            user_id,
            leave_type,
            status: LeaveStatus::Pending,
            interval,
            reason,
            manager_comment: None,
            created_at: timestamp,
            updated_at: timestamp,
            version: 1,
        }
    }

    /// Reconstructs a request from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedLeaveData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            leave_type: data.leave_type,
            status: data.status,
            interval: data.interval,
            reason: data.reason,
            manager_comment: data.manager_comment,
            created_at: data.created_at,
            updated_at: data.updated_at,
            version: data.version,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> LeaveId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the leave type.
    #[must_use]
    pub const fn leave_type(&self) -> LeaveType {
        self.leave_type
    }

    /// Returns the approval status.
    #[must_use]
    pub const fn status(&self) -> LeaveStatus {
        self.status
    }

    /// Returns the covered days.
    #[must_use]
    pub const fn interval(&self) -> LeaveInterval {
        self.interval
    }

    /// Returns the reason.
    #[must_use]
    pub const fn reason(&self) -> &LeaveReason {
        &self.reason
    }

    /// Returns the approver comment, if any.
    #[must_use]
    pub fn manager_comment(&self) -> Option<&str> {
        self.manager_comment.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the stored version this copy was read at.
    ///
    /// Repositories only accept a write whose version still matches the
    /// stored one, so a copy loaded before a concurrent write goes stale.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Moves to the version a repository assigns on a successful write.
    pub const fn advance_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    /// Returns `true` when the request is approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }

    /// Moves the request along the approval state machine.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveDomainError::InvalidStatusTransition`] when the edge is
    /// not allowed. The request is left unchanged.
    pub fn transition_to(
        &mut self,
        target: LeaveStatus,
        clock: &impl Clock,
    ) -> Result<(), LeaveDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(LeaveDomainError::InvalidStatusTransition {
                leave_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Sets the status without consulting the state machine, including
    /// reopening a decided request.
    pub fn override_status(&mut self, target: LeaveStatus, clock: &impl Clock) {
        self.status = target;
        self.touch(clock);
    }

    /// Applies content changes. Absent fields keep their current value.
    pub fn revise(&mut self, revision: LeaveRevision, clock: &impl Clock) {
        let LeaveRevision {
            leave_type,
            interval,
            reason,
            manager_comment,
        } = revision;
        if let Some(value) = leave_type {
            self.leave_type = value;
        }
        if let Some(value) = interval {
            self.interval = value;
        }
        if let Some(value) = reason {
            self.reason = value;
        }
        if let Some(value) = manager_comment {
            self.manager_comment = Some(value);
        }
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
