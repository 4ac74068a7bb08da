//! Error types for leave domain validation and parsing.

use super::{LeaveId, LeaveStatus};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating leave domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeaveDomainError {
    /// The end date precedes the start date.
    #[error("end date {end} must not be before start date {start}")]
    InvalidInterval {
        /// Requested first day of leave.
        start: NaiveDate,
        /// Requested last day of leave.
        end: NaiveDate,
    },

    /// The reason is empty after trimming.
    #[error("leave reason must not be empty")]
    EmptyReason,

    /// The requested status change is not an edge of the approval state
    /// machine.
    #[error("leave request {leave_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Leave request being transitioned.
        leave_id: LeaveId,
        /// Current status.
        from: LeaveStatus,
        /// Requested status.
        to: LeaveStatus,
    },
}

/// Error returned while parsing leave types from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown leave type: {0}")]
pub struct ParseLeaveTypeError(pub String);

/// Error returned while parsing leave statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown leave status: {0}")]
pub struct ParseLeaveStatusError(pub String);

/// Error returned while parsing user roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
