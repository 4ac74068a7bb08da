//! Directory port resolving users and teams.
//!
//! The directory is read-only from the leave workflow's perspective. It
//! supplies owner team membership for scoping and display names for
//! projections.

use crate::leave::domain::{Team, TeamId, UserId, UserProfile};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// User and team lookup contract.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user is unknown.
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<UserProfile>>;

    /// Finds a team by identifier.
    ///
    /// Returns `None` when the team is unknown.
    async fn find_team(&self, id: TeamId) -> DirectoryResult<Option<Team>>;

    /// Returns the identifiers of every member of `team_id`.
    async fn team_members(&self, team_id: TeamId) -> DirectoryResult<Vec<UserId>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Lookup-layer failure.
    #[error("directory lookup error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a lookup error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
