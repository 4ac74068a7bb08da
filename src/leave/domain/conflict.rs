//! Scheduling conflict rule shared by services and storage adapters.

use super::{LeaveId, LeaveInterval, LeaveRequest};

/// Returns the first approved request in `existing` whose interval overlaps
/// `candidate`, skipping the request identified by `exclude`.
///
/// Requests that are not approved never conflict.
pub fn find_conflict<'a, I>(
    candidate: LeaveInterval,
    existing: I,
    exclude: Option<LeaveId>,
) -> Option<&'a LeaveRequest>
where
    I: IntoIterator<Item = &'a LeaveRequest>,
{
    existing.into_iter().find(|leave| {
        leave.is_approved()
            && Some(leave.id()) != exclude
            && leave.interval().overlaps(candidate)
    })
}
