//! `PostgreSQL` user directory reading the `users` and `teams` tables.

use super::{
    models::{TeamRow, UserRow},
    pool::{LeavePgPool, run_blocking},
    schema::{teams, users},
};
use crate::leave::{
    domain::{Role, Team, TeamId, UserId, UserProfile},
    ports::{DirectoryError, DirectoryResult, UserDirectory},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed read-only directory.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: LeavePgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LeavePgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<UserProfile>> {
        run_blocking(&self.pool, move |connection| {
            let row = users::table
                .find(id.into_inner())
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(DirectoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_team(&self, id: TeamId) -> DirectoryResult<Option<Team>> {
        run_blocking(&self.pool, move |connection| {
            let row = teams::table
                .find(id.into_inner())
                .select(TeamRow::as_select())
                .first::<TeamRow>(connection)
                .optional()
                .map_err(DirectoryError::persistence)?;
            Ok(row.map(|team| Team {
                id: TeamId::from_uuid(team.id),
                name: team.name,
            }))
        })
        .await
    }

    async fn team_members(&self, team_id: TeamId) -> DirectoryResult<Vec<UserId>> {
        run_blocking(&self.pool, move |connection| {
            let ids = users::table
                .filter(users::team_id.eq(team_id.into_inner()))
                .select(users::id)
                .load::<uuid::Uuid>(connection)
                .map_err(DirectoryError::persistence)?;
            Ok(ids.into_iter().map(UserId::from_uuid).collect())
        })
        .await
    }
}

pub(super) fn row_to_user(row: UserRow) -> DirectoryResult<UserProfile> {
    let role = Role::try_from(row.role.as_str()).map_err(DirectoryError::persistence)?;
    Ok(UserProfile {
        id: UserId::from_uuid(row.id),
        name: row.name,
        role,
        team_id: row.team_id.map(TeamId::from_uuid),
    })
}
