//! Errors surfaced by the leave workflow.

use crate::leave::{
    domain::{LeaveDomainError, LeaveId, LeaveInterval, PolicyDenial},
    ports::{DirectoryError, LeaveRepositoryError},
};
use std::fmt;
use thiserror::Error;

/// Stable error category, suitable for mapping onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveErrorKind {
    /// The leave request does not exist.
    NotFound,
    /// The actor may not perform the operation.
    Forbidden,
    /// The start date falls after the end date.
    InvalidInterval,
    /// The dates overlap an approved request of the same owner.
    SchedulingConflict,
    /// The payload is malformed or empty.
    InvalidInput,
    /// The request changed while the operation ran. Retrying may succeed.
    ConcurrentModification,
    /// Storage or directory failure.
    Infrastructure,
}

impl LeaveErrorKind {
    /// Returns the snake-case error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::InvalidInterval => "invalid_interval",
            Self::SchedulingConflict => "scheduling_conflict",
            Self::InvalidInput => "invalid_input",
            Self::ConcurrentModification => "concurrent_modification",
            Self::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for LeaveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for leave workflow operations.
#[derive(Debug, Error)]
pub enum LeaveWorkflowError {
    /// The leave request does not exist.
    #[error("leave request not found: {0}")]
    NotFound(LeaveId),

    /// The actor may not perform the operation.
    #[error("{reason}")]
    Forbidden {
        /// Violated rule.
        reason: String,
    },

    /// The dates overlap an approved request of the same owner.
    #[error("the requested dates {interval} overlap an approved leave request")]
    SchedulingConflict {
        /// Rejected interval.
        interval: LeaveInterval,
        /// Approved request it overlaps, when known.
        existing: Option<LeaveId>,
    },

    /// Another write landed between reading the request and writing it.
    #[error("leave request {0} was changed concurrently; reload it and retry")]
    ConcurrentModification(LeaveId),

    /// An update named no field.
    #[error("an update must change at least one field")]
    EmptyUpdate,

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] LeaveDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] LeaveRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl LeaveWorkflowError {
    /// Builds a [`Self::Forbidden`] error.
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> LeaveErrorKind {
        match self {
            Self::NotFound(_) | Self::Repository(LeaveRepositoryError::NotFound(_)) => {
                LeaveErrorKind::NotFound
            }
            Self::Forbidden { .. }
            | Self::Domain(LeaveDomainError::InvalidStatusTransition { .. }) => {
                LeaveErrorKind::Forbidden
            }
            Self::SchedulingConflict { .. }
            | Self::Repository(LeaveRepositoryError::OverlappingApproval { .. }) => {
                LeaveErrorKind::SchedulingConflict
            }
            Self::Domain(LeaveDomainError::InvalidInterval { .. }) => {
                LeaveErrorKind::InvalidInterval
            }
            Self::EmptyUpdate | Self::Domain(LeaveDomainError::EmptyReason) => {
                LeaveErrorKind::InvalidInput
            }
            Self::ConcurrentModification(_)
            | Self::Repository(LeaveRepositoryError::StaleWrite { .. }) => {
                LeaveErrorKind::ConcurrentModification
            }
            Self::Repository(_) | Self::Directory(_) => LeaveErrorKind::Infrastructure,
        }
    }

    /// Returns `true` when repeating the operation on fresh data may
    /// succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), LeaveErrorKind::ConcurrentModification)
    }
}

impl From<PolicyDenial> for LeaveWorkflowError {
    fn from(denial: PolicyDenial) -> Self {
        Self::forbidden(denial.reason)
    }
}

/// Result type for leave workflow operations.
pub type LeaveWorkflowResult<T> = Result<T, LeaveWorkflowError>;
