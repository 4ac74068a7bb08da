//! Scheduling conflict detection against a user's approved leave.

use crate::leave::{
    domain::{LeaveId, LeaveInterval, UserId, find_conflict},
    ports::{LeaveRepository, LeaveRepositoryResult},
};
use std::sync::Arc;

/// Detects overlaps between a candidate interval and a user's approved
/// leave requests.
///
/// The check is advisory: it gives callers a precise error before a write,
/// while the repository enforces the same rule atomically.
#[derive(Clone)]
pub struct ConflictDetector<R>
where
    R: LeaveRepository,
{
    repository: Arc<R>,
}

impl<R> ConflictDetector<R>
where
    R: LeaveRepository,
{
    /// Creates a detector reading from `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the identifier of the first approved request of `user_id`
    /// overlapping `candidate`, ignoring `exclude`.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the lookup fails.
    pub async fn first_conflict(
        &self,
        user_id: UserId,
        candidate: LeaveInterval,
        exclude: Option<LeaveId>,
    ) -> LeaveRepositoryResult<Option<LeaveId>> {
        let approved = self.repository.find_approved_for_user(user_id).await?;
        Ok(find_conflict(candidate, &approved, exclude).map(|leave| leave.id()))
    }

    /// Returns `true` when `candidate` overlaps an approved request of
    /// `user_id` other than `exclude`.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the lookup fails.
    pub async fn has_conflict(
        &self,
        user_id: UserId,
        candidate: LeaveInterval,
        exclude: Option<LeaveId>,
    ) -> LeaveRepositoryResult<bool> {
        Ok(self
            .first_conflict(user_id, candidate, exclude)
            .await?
            .is_some())
    }
}
