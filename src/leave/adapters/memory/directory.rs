//! In-memory user directory for tests and embedding.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::leave::{
    domain::{Team, TeamId, UserId, UserProfile},
    ports::{DirectoryError, DirectoryResult, UserDirectory},
};

/// Thread-safe in-memory user and team directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<UserId, UserProfile>,
    teams: HashMap<TeamId, Team>,
}

fn poisoned(err: &impl ToString) -> DirectoryError {
    DirectoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Persistence`] when the lock is poisoned.
    pub fn insert_user(&self, user: UserProfile) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.users.insert(user.id, user);
        Ok(())
    }

    /// Adds or replaces a team.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Persistence`] when the lock is poisoned.
    pub fn insert_team(&self, team: Team) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        state.teams.insert(team.id, team);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<UserProfile>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_team(&self, id: TeamId) -> DirectoryResult<Option<Team>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state.teams.get(&id).cloned())
    }

    async fn team_members(&self, team_id: TeamId) -> DirectoryResult<Vec<UserId>> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(state
            .users
            .values()
            .filter(|user| user.team_id == Some(team_id))
            .map(|user| user.id)
            .collect())
    }
}
