//! Authenticated actors and the read-only user/team records consulted for
//! scoping and projection.

use super::{ParseRoleError, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a user in the approval hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    /// Files leave requests for themselves.
    Employee,
    /// Approves or rejects requests from their own team.
    Manager,
    /// Unrestricted access to every request.
    Hr,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Hr => "hr",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "hr" => Ok(Self::Hr),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ParseRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Identity performing an operation, already authenticated upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    id: UserId,
    role: Role,
    team_id: Option<TeamId>,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role, team_id: Option<TeamId>) -> Self {
        Self { id, role, team_id }
    }

    /// Actor's user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Actor's team, if any.
    #[must_use]
    pub const fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    /// Returns `true` when the actor belongs to `team`.
    ///
    /// An actor without a team never shares a team with anyone, including
    /// other users without a team.
    #[must_use]
    pub fn shares_team(&self, team: Option<TeamId>) -> bool {
        matches!((self.team_id, team), (Some(own), Some(other)) if own == other)
    }
}

/// Directory entry for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role in the approval hierarchy.
    pub role: Role,
    /// Team membership, if any.
    pub team_id: Option<TeamId>,
}

impl UserProfile {
    /// Returns the actor this user acts as.
    #[must_use]
    pub const fn as_actor(&self) -> Actor {
        Actor::new(self.id, self.role, self.team_id)
    }
}

/// Directory entry for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
}
