//! In-memory repository for leave workflow tests.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::leave::{
    domain::{LeaveId, LeaveRequest, UserId, find_conflict},
    ports::{LeaveFilter, LeaveRepository, LeaveRepositoryError, LeaveRepositoryResult},
};

/// Thread-safe in-memory leave repository.
///
/// Every write holds the state lock across the version check, the overlap
/// check and the insert, which serializes writes per request and approvals
/// per owner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeaveRepository {
    state: Arc<RwLock<InMemoryLeaveState>>,
}

#[derive(Debug, Default)]
struct InMemoryLeaveState {
    leaves: HashMap<LeaveId, LeaveRequest>,
    owner_index: HashMap<UserId, Vec<LeaveId>>,
}

impl InMemoryLeaveRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryLeaveState {
    /// Checks that `leave` was read at the stored version.
    fn ensure_current(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        let stored = self
            .leaves
            .get(&leave.id())
            .ok_or(LeaveRepositoryError::NotFound(leave.id()))?;
        if stored.version() != leave.version() {
            return Err(LeaveRepositoryError::StaleWrite {
                leave_id: leave.id(),
                expected: leave.version(),
            });
        }
        Ok(())
    }

    fn owned_by(&self, user_id: UserId) -> impl Iterator<Item = &LeaveRequest> {
        self.owner_index
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.leaves.get(id))
    }

    /// Rejects `leave` when it is approved and overlaps another approved
    /// request of the same owner.
    fn ensure_no_overlap(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        if !leave.is_approved() {
            return Ok(());
        }
        let owned = self.owned_by(leave.user_id());
        find_conflict(leave.interval(), owned, Some(leave.id())).map_or(Ok(()), |existing| {
            Err(LeaveRepositoryError::OverlappingApproval {
                leave_id: leave.id(),
                existing: Some(existing.id()),
            })
        })
    }
}

fn poisoned(err: &impl ToString) -> LeaveRepositoryError {
    LeaveRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl LeaveRepository for InMemoryLeaveRepository {
    async fn store(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        if state.leaves.contains_key(&leave.id()) {
            return Err(LeaveRepositoryError::DuplicateLeave(leave.id()));
        }
        state.ensure_no_overlap(leave)?;

        state
            .owner_index
            .entry(leave.user_id())
            .or_default()
            .push(leave.id());
        state.leaves.insert(leave.id(), leave.clone());
        Ok(())
    }

    async fn update(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.ensure_current(leave)?;
        state.ensure_no_overlap(leave)?;

        // Owner is immutable, so the owner index stays valid.
        let mut written = leave.clone();
        written.advance_version();
        state.leaves.insert(leave.id(), written);
        Ok(())
    }

    async fn find_by_id(&self, id: LeaveId) -> LeaveRepositoryResult<Option<LeaveRequest>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.leaves.get(&id).cloned())
    }

    async fn find_many(&self, filter: &LeaveFilter) -> LeaveRepositoryResult<Vec<LeaveRequest>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        let mut found: Vec<LeaveRequest> = state
            .leaves
            .values()
            .filter(|leave| filter.matches(leave))
            .cloned()
            .collect();
        found.sort_by_key(|leave| (Reverse(leave.created_at()), leave.id()));
        Ok(found)
    }

    async fn find_approved_for_user(
        &self,
        user_id: UserId,
    ) -> LeaveRepositoryResult<Vec<LeaveRequest>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state
            .owned_by(user_id)
            .filter(|leave| leave.is_approved())
            .cloned()
            .collect())
    }

    async fn remove(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        let id = leave.id();
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.ensure_current(leave)?;
        let removed = state
            .leaves
            .remove(&id)
            .ok_or(LeaveRepositoryError::NotFound(id))?;
        if let Some(ids) = state.owner_index.get_mut(&removed.user_id()) {
            ids.retain(|owned| *owned != id);
            if ids.is_empty() {
                state.owner_index.remove(&removed.user_id());
            }
        }
        Ok(())
    }
}
