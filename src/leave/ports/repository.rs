//! Repository port for leave request persistence and lookup.

use crate::leave::domain::{LeaveId, LeaveRequest, LeaveStatus, LeaveType, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for leave repository operations.
pub type LeaveRepositoryResult<T> = Result<T, LeaveRepositoryError>;

/// Leave request persistence contract.
///
/// Implementations must make the overlap check and the write of an approved
/// request atomic with respect to other writes for the same owner, so two
/// concurrent approvals cannot both succeed.
///
/// Updates and removals are conditional on [`LeaveRequest::version`]: the
/// caller passes the copy it read, and the write is refused when another
/// write landed in between.
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    /// Stores a new leave request.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveRepositoryError::DuplicateLeave`] when the identifier
    /// already exists, or [`LeaveRepositoryError::OverlappingApproval`] when
    /// an approved request would overlap another approved request of the
    /// same owner.
    async fn store(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()>;

    /// Persists changes to an existing leave request read at
    /// `leave.version()`. The stored copy moves to the next version.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveRepositoryError::NotFound`] when the request does not
    /// exist, [`LeaveRepositoryError::StaleWrite`] when the stored version
    /// differs, or [`LeaveRepositoryError::OverlappingApproval`] under the
    /// same rule as [`Self::store`].
    async fn update(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()>;

    /// Finds a leave request by identifier.
    ///
    /// Returns `None` when the request does not exist.
    async fn find_by_id(&self, id: LeaveId) -> LeaveRepositoryResult<Option<LeaveRequest>>;

    /// Returns requests matching `filter`, newest first by creation time.
    async fn find_many(&self, filter: &LeaveFilter) -> LeaveRepositoryResult<Vec<LeaveRequest>>;

    /// Returns every approved request owned by `user_id`.
    async fn find_approved_for_user(
        &self,
        user_id: UserId,
    ) -> LeaveRepositoryResult<Vec<LeaveRequest>>;

    /// Hard-removes a leave request read at `leave.version()`.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveRepositoryError::NotFound`] when the request does not
    /// exist, or [`LeaveRepositoryError::StaleWrite`] when the stored version
    /// differs.
    async fn remove(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()>;
}

/// Query predicate for [`LeaveRepository::find_many`].
///
/// Every populated criterion must hold. An owner set of `None` matches any
/// owner; an empty owner set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    owners: Option<BTreeSet<UserId>>,
    status: Option<LeaveStatus>,
    leave_type: Option<LeaveType>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl LeaveFilter {
    /// Creates a filter matching every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to the given owners.
    #[must_use]
    pub fn with_owners(mut self, owners: impl IntoIterator<Item = UserId>) -> Self {
        self.owners = Some(owners.into_iter().collect());
        self
    }

    /// Restricts results to a status.
    #[must_use]
    pub const fn with_status(mut self, status: LeaveStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts results to a leave type.
    #[must_use]
    pub const fn with_leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = Some(leave_type);
        self
    }

    /// Restricts results to requests intersecting the window. Either bound
    /// may be open.
    #[must_use]
    pub const fn with_window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Owner restriction, if any.
    #[must_use]
    pub const fn owners(&self) -> Option<&BTreeSet<UserId>> {
        self.owners.as_ref()
    }

    /// Status restriction, if any.
    #[must_use]
    pub const fn status(&self) -> Option<LeaveStatus> {
        self.status
    }

    /// Leave type restriction, if any.
    #[must_use]
    pub const fn leave_type(&self) -> Option<LeaveType> {
        self.leave_type
    }

    /// Lower window bound, if any.
    #[must_use]
    pub const fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    /// Upper window bound, if any.
    #[must_use]
    pub const fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    /// Returns `true` when `leave` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, leave: &LeaveRequest) -> bool {
        self.owners
            .as_ref()
            .is_none_or(|owners| owners.contains(&leave.user_id()))
            && self.status.is_none_or(|status| leave.status() == status)
            && self
                .leave_type
                .is_none_or(|leave_type| leave.leave_type() == leave_type)
            && leave.interval().intersects_window(self.from, self.to)
    }
}

/// Errors returned by leave repository implementations.
#[derive(Debug, Clone, Error)]
pub enum LeaveRepositoryError {
    /// A request with the same identifier already exists.
    #[error("duplicate leave request identifier: {0}")]
    DuplicateLeave(LeaveId),

    /// The request was not found.
    #[error("leave request not found: {0}")]
    NotFound(LeaveId),

    /// Writing the request would give its owner two overlapping approved
    /// requests.
    #[error("leave request {leave_id} overlaps an approved leave request of the same owner")]
    OverlappingApproval {
        /// Request being written.
        leave_id: LeaveId,
        /// Approved request it overlaps, when known.
        existing: Option<LeaveId>,
    },

    /// The request changed since the caller read it.
    #[error("leave request {leave_id} changed since version {expected} was read")]
    StaleWrite {
        /// Request being written.
        leave_id: LeaveId,
        /// Version the caller read.
        expected: u32,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LeaveRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
