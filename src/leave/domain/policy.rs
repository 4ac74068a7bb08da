//! Role-scoped authorization for leave requests.
//!
//! The policy is a pure capability table keyed by `(role, action)`. It never
//! performs lookups itself: callers resolve the owner and owner's team of a
//! record into a [`LeaveTarget`] first.

use super::{Actor, LeaveStatus, Role, TeamId, UserId};
use std::fmt;
use thiserror::Error;

/// Operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// File a new request.
    Create,
    /// Read a single request.
    Read,
    /// List requests.
    List,
    /// Change fields of a request.
    Update,
    /// Remove a request.
    Delete,
}

impl Action {
    /// Returns a lowercase name for logs and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable fields of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveField {
    /// Leave category.
    Type,
    /// First day.
    StartDate,
    /// Last day.
    EndDate,
    /// Free-text justification.
    Reason,
    /// Approval status.
    Status,
    /// Approver comment.
    ManagerComment,
}

impl LeaveField {
    /// Every field, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Type,
        Self::StartDate,
        Self::EndDate,
        Self::Reason,
        Self::Status,
        Self::ManagerComment,
    ];

    /// Returns the field name as exposed to API callers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::Reason => "reason",
            Self::Status => "status",
            Self::ManagerComment => "managerComment",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Type => 1,
            Self::StartDate => 1 << 1,
            Self::EndDate => 1 << 2,
            Self::Reason => 1 << 3,
            Self::Status => 1 << 4,
            Self::ManagerComment => 1 << 5,
        }
    }
}

impl fmt::Display for LeaveField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of [`LeaveField`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldSet(u8);

impl FieldSet {
    /// No fields.
    pub const EMPTY: Self = Self(0);

    /// Content fields an owner fills in.
    pub const CONTENT: Self = Self::EMPTY
        .with(LeaveField::Type)
        .with(LeaveField::StartDate)
        .with(LeaveField::EndDate)
        .with(LeaveField::Reason);

    /// Decision fields an approver fills in.
    pub const DECISION: Self = Self::EMPTY
        .with(LeaveField::Status)
        .with(LeaveField::ManagerComment);

    /// Every field.
    pub const ALL: Self = Self(Self::CONTENT.0 | Self::DECISION.0);

    /// Returns a copy of the set including `field`.
    #[must_use]
    pub const fn with(self, field: LeaveField) -> Self {
        Self(self.0 | field.bit())
    }

    /// Returns `true` when `field` is in the set.
    #[must_use]
    pub const fn contains(self, field: LeaveField) -> bool {
        self.0 & field.bit() != 0
    }

    /// Returns `true` when the set holds no field.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the fields of `self` absent from `allowed`.
    #[must_use]
    pub const fn outside(self, allowed: Self) -> Self {
        Self(self.0 & !allowed.0)
    }

    /// Iterates the fields in declaration order.
    pub fn iter(self) -> impl Iterator<Item = LeaveField> {
        LeaveField::ALL
            .into_iter()
            .filter(move |field| self.contains(*field))
    }
}

impl FromIterator<LeaveField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = LeaveField>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Which records a capability reaches, relative to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordScope {
    /// Records owned by the actor.
    Own,
    /// Records whose owner shares the actor's team.
    Team,
    /// Union of [`Self::Own`] and [`Self::Team`].
    OwnOrTeam,
    /// Every record.
    All,
}

impl RecordScope {
    /// Returns `true` when a record owned by `owner` (member of
    /// `owner_team`) falls inside this scope for `actor`.
    #[must_use]
    pub fn admits(self, actor: &Actor, owner: UserId, owner_team: Option<TeamId>) -> bool {
        let own = owner == actor.id();
        match self {
            Self::Own => own,
            Self::Team => actor.shares_team(owner_team),
            Self::OwnOrTeam => own || actor.shares_team(owner_team),
            Self::All => true,
        }
    }
}

/// Row of the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Records the action reaches.
    pub scope: RecordScope,
    /// Whether the target must still be pending.
    pub requires_pending: bool,
    /// Fields the action may change.
    pub editable: FieldSet,
}

/// Capability table keyed by role and action.
#[must_use]
pub const fn capability(role: Role, action: Action) -> Capability {
    let (scope, requires_pending) = match (role, action) {
        (_, Action::Create) | (Role::Hr, _) => (RecordScope::All, false),
        (Role::Employee, Action::Read | Action::List) => (RecordScope::Own, false),
        (Role::Employee, Action::Update | Action::Delete) => (RecordScope::Own, true),
        (Role::Manager, Action::Read | Action::List) => (RecordScope::OwnOrTeam, false),
        (Role::Manager, Action::Update | Action::Delete) => (RecordScope::Team, true),
    };
    Capability {
        scope,
        requires_pending,
        editable: editable_fields(role, action),
    }
}

/// Fields `role` may change through `action`.
#[must_use]
pub const fn editable_fields(role: Role, action: Action) -> FieldSet {
    match (role, action) {
        (_, Action::Create) | (Role::Employee, Action::Update) => FieldSet::CONTENT,
        (Role::Manager, Action::Update) => FieldSet::DECISION,
        (Role::Hr, Action::Update) => FieldSet::ALL,
        _ => FieldSet::EMPTY,
    }
}

/// Ownership and status of the record an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveTarget {
    /// Owning user.
    pub owner: UserId,
    /// Team of the owning user, if any.
    pub owner_team: Option<TeamId>,
    /// Current status.
    pub status: LeaveStatus,
}

/// Authorization denial carrying the violated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PolicyDenial {
    /// Denied action.
    pub action: Action,
    /// Human-readable rule.
    pub reason: &'static str,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    action: Action,
    allowed: bool,
    editable_fields: FieldSet,
    reason: Option<&'static str>,
}

impl Decision {
    const fn allow(action: Action, editable_fields: FieldSet) -> Self {
        Self {
            action,
            allowed: true,
            editable_fields,
            reason: None,
        }
    }

    const fn deny(action: Action, reason: &'static str) -> Self {
        Self {
            action,
            allowed: false,
            editable_fields: FieldSet::EMPTY,
            reason: Some(reason),
        }
    }

    /// Whether the action is permitted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Fields the actor may change. Empty when denied.
    #[must_use]
    pub const fn editable_fields(&self) -> FieldSet {
        self.editable_fields
    }

    /// Denial reason, if denied.
    #[must_use]
    pub const fn reason(&self) -> Option<&'static str> {
        self.reason
    }

    /// Converts the decision into the editable field set or a denial.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyDenial`] when the action is not permitted.
    pub const fn into_result(self) -> Result<FieldSet, PolicyDenial> {
        match self.reason {
            Some(reason) if !self.allowed => Err(PolicyDenial {
                action: self.action,
                reason,
            }),
            _ => Ok(self.editable_fields),
        }
    }
}

/// Rule that failed during authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    MissingTarget,
    OutOfScope,
    NotPending,
}

const fn denial_reason(role: Role, action: Action, violation: Violation) -> &'static str {
    match (violation, role, action) {
        (Violation::MissingTarget, _, _) => "a target leave request is required",
        (Violation::OutOfScope, Role::Employee, Action::Read) => {
            "you can only view your own leaves"
        }
        (Violation::OutOfScope, Role::Manager, Action::Read) => {
            "you can only view your own leaves or your team members' leaves"
        }
        (Violation::OutOfScope, Role::Employee, Action::Update) => {
            "you can only edit your own leaves"
        }
        (Violation::OutOfScope, Role::Manager, Action::Update) => {
            "you can only manage leaves from your team"
        }
        (Violation::OutOfScope, Role::Employee, Action::Delete) => {
            "you can only cancel your own leaves"
        }
        (Violation::OutOfScope, Role::Manager, Action::Delete) => {
            "you can only cancel leaves from your team"
        }
        (Violation::NotPending, Role::Employee, Action::Update) => {
            "you can only edit leaves with pending status"
        }
        (Violation::NotPending, _, Action::Update) => {
            "you can only update leaves with pending status"
        }
        (Violation::NotPending, _, _) => "you can only cancel leaves with pending status",
        (Violation::OutOfScope, _, _) => "this leave request is outside your scope",
    }
}

/// Decides whether `actor` may perform `action` on `target`.
///
/// `target` is required for read, update and delete; create and list do not
/// take one. Scope is checked before the pending-status guard.
#[must_use]
pub fn authorize(actor: &Actor, action: Action, target: Option<&LeaveTarget>) -> Decision {
    let role = actor.role();
    let rule = capability(role, action);
    if matches!(action, Action::Create | Action::List) {
        return Decision::allow(action, rule.editable);
    }
    let Some(record) = target else {
        return Decision::deny(action, denial_reason(role, action, Violation::MissingTarget));
    };
    if !rule.scope.admits(actor, record.owner, record.owner_team) {
        return Decision::deny(action, denial_reason(role, action, Violation::OutOfScope));
    }
    if rule.requires_pending && record.status != LeaveStatus::Pending {
        return Decision::deny(action, denial_reason(role, action, Violation::NotPending));
    }
    Decision::allow(action, rule.editable)
}

/// Records an actor may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListScope {
    actor: Actor,
    scope: RecordScope,
}

impl ListScope {
    /// Listing scope of `actor`.
    #[must_use]
    pub const fn for_actor(actor: Actor) -> Self {
        Self {
            actor,
            scope: capability(actor.role(), Action::List).scope,
        }
    }

    /// Actor the scope was derived for.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Scope kind.
    #[must_use]
    pub const fn scope(&self) -> RecordScope {
        self.scope
    }

    /// Returns `true` when a record owned by `owner` may be listed.
    #[must_use]
    pub fn admits(&self, owner: UserId, owner_team: Option<TeamId>) -> bool {
        self.scope.admits(&self.actor, owner, owner_team)
    }
}
