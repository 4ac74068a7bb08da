//! Leave request lifecycle orchestration.
//!
//! Every operation follows the same order: load the target, authorize the
//! actor, validate the payload, check scheduling conflicts, then persist.
//! Writes are conditional on the version that was loaded, so a decision
//! taken on a stale snapshot is refused rather than applied.

use super::{
    ConflictDetector, CreateLeaveRequest, LeaveListQuery, LeavePatch, LeaveView,
    LeaveWorkflowError, LeaveWorkflowResult,
};
use crate::leave::{
    domain::{
        Action, Actor, LeaveField, LeaveId, LeaveInterval, LeaveReason, LeaveRequest,
        LeaveRevision, LeaveStatus, LeaveTarget, ListScope, PolicyDenial, RecordScope, Role,
        Team, TeamId, UserId, UserProfile, authorize,
    },
    ports::{LeaveFilter, LeaveRepository, LeaveRepositoryError, UserDirectory},
};
use mockable::Clock;
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};
use tracing::{debug, info, instrument, warn};

const DECISION_ONLY: &str = "you can only approve or reject leaves with pending status";

/// Leave workflow orchestration service.
#[derive(Clone)]
pub struct LeaveWorkflowService<R, D, C>
where
    R: LeaveRepository,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    clock: Arc<C>,
    conflicts: ConflictDetector<R>,
}

impl<R, D, C> LeaveWorkflowService<R, D, C>
where
    R: LeaveRepository,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new leave workflow service.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        let conflicts = ConflictDetector::new(Arc::clone(&repository));
        Self {
            repository,
            directory,
            clock,
            conflicts,
        }
    }

    /// Files a pending leave request owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveWorkflowError`] when the dates are inverted, the
    /// reason is blank, the dates overlap one of the actor's approved
    /// requests, or persistence fails.
    #[instrument(skip_all, fields(actor = %actor.id(), role = %actor.role()))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateLeaveRequest,
    ) -> LeaveWorkflowResult<LeaveView> {
        authorize(actor, Action::Create, None)
            .into_result()
            .map_err(|denial| deny(actor, None, denial))?;

        let (leave_type, start_date, end_date, reason) = request.into_parts();
        let interval = LeaveInterval::new(start_date, end_date)?;
        let validated_reason = LeaveReason::new(reason)?;
        self.ensure_no_conflict(actor.id(), interval, None).await?;

        let leave = LeaveRequest::submit(
            actor.id(),
            leave_type,
            interval,
            validated_reason,
            &*self.clock,
        );
        self.repository
            .store(&leave)
            .await
            .map_err(|err| write_error(err, interval))?;
        info!(leave_id = %leave.id(), %interval, "leave request submitted");
        self.project(&leave).await
    }

    /// Lists the leave requests visible to `actor`, newest first.
    ///
    /// Query filters narrow the actor's scope and never widen it. The user
    /// filter is ignored for employees.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveWorkflowError`] when the directory or repository
    /// lookup fails.
    #[instrument(skip_all, fields(actor = %actor.id(), role = %actor.role()))]
    pub async fn list(
        &self,
        actor: &Actor,
        query: LeaveListQuery,
    ) -> LeaveWorkflowResult<Vec<LeaveView>> {
        let scope = ListScope::for_actor(*actor);
        let mut filter = LeaveFilter::new().with_window(query.from, query.to);
        if let Some(owners) = self.resolve_owners(&scope, &query).await? {
            filter = filter.with_owners(owners);
        }
        if let Some(status) = query.status {
            filter = filter.with_status(status);
        }
        if let Some(leave_type) = query.leave_type {
            filter = filter.with_leave_type(leave_type);
        }

        let leaves = self.repository.find_many(&filter).await?;
        let mut names = NameCache::default();
        let mut views = Vec::with_capacity(leaves.len());
        for leave in &leaves {
            let owner = names.user(&*self.directory, leave.user_id()).await?;
            let owner_team = owner.as_ref().and_then(|profile| profile.team_id);
            if !scope.admits(leave.user_id(), owner_team) {
                warn!(leave_id = %leave.id(), "dropping leave request outside list scope");
                continue;
            }
            let team = match owner_team {
                Some(team_id) => names.team(&*self.directory, team_id).await?,
                None => None,
            };
            views.push(LeaveView::project(leave, owner.as_ref(), team.as_ref()));
        }
        debug!(count = views.len(), "listed leave requests");
        Ok(views)
    }

    /// Fetches one leave request.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveWorkflowError::NotFound`] when the request does not
    /// exist and [`LeaveWorkflowError::Forbidden`] when it lies outside the
    /// actor's scope.
    #[instrument(skip_all, fields(actor = %actor.id(), leave_id = %id))]
    pub async fn get(&self, actor: &Actor, id: LeaveId) -> LeaveWorkflowResult<LeaveView> {
        let leave = self.load(id).await?;
        let owner = self.directory.find_user(leave.user_id()).await?;
        let target = target_of(&leave, owner.as_ref());
        authorize(actor, Action::Read, Some(&target))
            .into_result()
            .map_err(|denial| deny(actor, Some(id), denial))?;
        self.project_with(&leave, owner.as_ref()).await
    }

    /// Applies `patch` to a leave request.
    ///
    /// Checks run in order: existence, authorization, field permissions,
    /// non-empty patch, semantic validation, scheduling conflicts.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveWorkflowError`] describing the first failed check.
    #[instrument(skip_all, fields(actor = %actor.id(), role = %actor.role(), leave_id = %id))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: LeaveId,
        patch: LeavePatch,
    ) -> LeaveWorkflowResult<LeaveView> {
        let current = self.load(id).await?;
        let owner = self.directory.find_user(current.user_id()).await?;
        let target = target_of(&current, owner.as_ref());
        let allowed = authorize(actor, Action::Update, Some(&target))
            .into_result()
            .map_err(|denial| deny(actor, Some(id), denial))?;

        let requested = patch.fields();
        if let Some(field) = requested.outside(allowed).iter().next() {
            debug!(%field, "field not editable by role");
            return Err(LeaveWorkflowError::forbidden(format!(
                "role {} cannot change field '{field}'",
                actor.role()
            )));
        }
        if requested.is_empty() {
            return Err(LeaveWorkflowError::EmptyUpdate);
        }

        let touches_dates = patch.touches_dates();
        let revised = self.apply_patch(actor, &current, patch)?;
        let becomes_approved = revised.is_approved() && !current.is_approved();
        if revised.is_approved() && (touches_dates || becomes_approved) {
            self.ensure_no_conflict(revised.user_id(), revised.interval(), Some(id))
                .await?;
        }

        self.repository
            .update(&revised)
            .await
            .map_err(|err| write_error(err, revised.interval()))?;
        info!(
            from = %current.status(),
            to = %revised.status(),
            fields = ?requested.iter().map(LeaveField::as_str).collect::<Vec<_>>(),
            "leave request updated"
        );
        self.project_with(&revised, owner.as_ref()).await
    }

    /// Removes a leave request.
    ///
    /// # Errors
    ///
    /// Returns [`LeaveWorkflowError::NotFound`] when the request does not
    /// exist and [`LeaveWorkflowError::Forbidden`] when the actor may not
    /// cancel it.
    #[instrument(skip_all, fields(actor = %actor.id(), role = %actor.role(), leave_id = %id))]
    pub async fn delete(&self, actor: &Actor, id: LeaveId) -> LeaveWorkflowResult<()> {
        let leave = self.load(id).await?;
        let owner = self.directory.find_user(leave.user_id()).await?;
        let target = target_of(&leave, owner.as_ref());
        authorize(actor, Action::Delete, Some(&target))
            .into_result()
            .map_err(|denial| deny(actor, Some(id), denial))?;
        self.repository
            .remove(&leave)
            .await
            .map_err(|err| write_error(err, leave.interval()))?;
        info!(status = %leave.status(), "leave request deleted");
        Ok(())
    }

    async fn load(&self, id: LeaveId) -> LeaveWorkflowResult<LeaveRequest> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(LeaveWorkflowError::NotFound(id))
    }

    async fn ensure_no_conflict(
        &self,
        user_id: UserId,
        interval: LeaveInterval,
        exclude: Option<LeaveId>,
    ) -> LeaveWorkflowResult<()> {
        let conflict = self
            .conflicts
            .first_conflict(user_id, interval, exclude)
            .await?;
        if let Some(existing) = conflict {
            debug!(%existing, %interval, "scheduling conflict");
            return Err(LeaveWorkflowError::SchedulingConflict {
                interval,
                existing: Some(existing),
            });
        }
        Ok(())
    }

    fn apply_patch(
        &self,
        actor: &Actor,
        current: &LeaveRequest,
        patch: LeavePatch,
    ) -> LeaveWorkflowResult<LeaveRequest> {
        let LeavePatch {
            leave_type,
            start_date,
            end_date,
            reason,
            status,
            manager_comment,
        } = patch;

        let interval = if start_date.is_some() || end_date.is_some() {
            let existing = current.interval();
            Some(LeaveInterval::new(
                start_date.unwrap_or(existing.start()),
                end_date.unwrap_or(existing.end()),
            )?)
        } else {
            None
        };
        let validated_reason = reason.map(LeaveReason::new).transpose()?;

        let mut revised = current.clone();
        if let Some(target) = status {
            self.change_status(actor, &mut revised, target)?;
        }
        revised.revise(
            LeaveRevision {
                leave_type,
                interval,
                reason: validated_reason,
                manager_comment,
            },
            &*self.clock,
        );
        Ok(revised)
    }

    fn change_status(
        &self,
        actor: &Actor,
        leave: &mut LeaveRequest,
        target: LeaveStatus,
    ) -> LeaveWorkflowResult<()> {
        if actor.role() == Role::Hr {
            leave.override_status(target, &*self.clock);
            return Ok(());
        }
        leave.transition_to(target, &*self.clock).map_err(|err| {
            debug!(error = %err, "status transition refused");
            LeaveWorkflowError::forbidden(DECISION_ONLY)
        })
    }

    /// Owners the listing may return. `None` means unrestricted.
    async fn resolve_owners(
        &self,
        scope: &ListScope,
        query: &LeaveListQuery,
    ) -> LeaveWorkflowResult<Option<BTreeSet<UserId>>> {
        let actor = scope.actor();
        let mut owners = match scope.scope() {
            RecordScope::Own => Some(BTreeSet::from([actor.id()])),
            RecordScope::Team => Some(self.members_of(actor.team_id()).await?),
            RecordScope::OwnOrTeam => {
                let mut members = self.members_of(actor.team_id()).await?;
                members.insert(actor.id());
                Some(members)
            }
            RecordScope::All => None,
        };
        if let Some(user_id) = query
            .user_id
            .filter(|_| scope.scope() != RecordScope::Own)
        {
            owners = Some(narrow(owners, BTreeSet::from([user_id])));
        }
        if let Some(team_id) = query.team_id {
            let members = self.members_of(Some(team_id)).await?;
            owners = Some(narrow(owners, members));
        }
        Ok(owners)
    }

    async fn members_of(&self, team_id: Option<TeamId>) -> LeaveWorkflowResult<BTreeSet<UserId>> {
        match team_id {
            Some(team) => Ok(self
                .directory
                .team_members(team)
                .await?
                .into_iter()
                .collect()),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn project(&self, leave: &LeaveRequest) -> LeaveWorkflowResult<LeaveView> {
        let owner = self.directory.find_user(leave.user_id()).await?;
        self.project_with(leave, owner.as_ref()).await
    }

    async fn project_with(
        &self,
        leave: &LeaveRequest,
        owner: Option<&UserProfile>,
    ) -> LeaveWorkflowResult<LeaveView> {
        let team = match owner.and_then(|profile| profile.team_id) {
            Some(team_id) => self.directory.find_team(team_id).await?,
            None => None,
        };
        Ok(LeaveView::project(leave, owner, team.as_ref()))
    }
}

/// Directory lookups memoized for one listing.
#[derive(Default)]
struct NameCache {
    users: HashMap<UserId, Option<UserProfile>>,
    teams: HashMap<TeamId, Option<Team>>,
}

impl NameCache {
    async fn user(
        &mut self,
        directory: &impl UserDirectory,
        id: UserId,
    ) -> LeaveWorkflowResult<Option<UserProfile>> {
        if let Some(cached) = self.users.get(&id) {
            return Ok(cached.clone());
        }
        let found = directory.find_user(id).await?;
        self.users.insert(id, found.clone());
        Ok(found)
    }

    async fn team(
        &mut self,
        directory: &impl UserDirectory,
        id: TeamId,
    ) -> LeaveWorkflowResult<Option<Team>> {
        if let Some(cached) = self.teams.get(&id) {
            return Ok(cached.clone());
        }
        let found = directory.find_team(id).await?;
        self.teams.insert(id, found.clone());
        Ok(found)
    }
}

fn target_of(leave: &LeaveRequest, owner: Option<&UserProfile>) -> LeaveTarget {
    LeaveTarget {
        owner: leave.user_id(),
        owner_team: owner.and_then(|profile| profile.team_id),
        status: leave.status(),
    }
}

fn narrow(current: Option<BTreeSet<UserId>>, allowed: BTreeSet<UserId>) -> BTreeSet<UserId> {
    let Some(mut owners) = current else {
        return allowed;
    };
    owners.retain(|owner| allowed.contains(owner));
    owners
}

fn deny(actor: &Actor, leave_id: Option<LeaveId>, denial: PolicyDenial) -> LeaveWorkflowError {
    debug!(
        actor = %actor.id(),
        action = %denial.action,
        leave_id = ?leave_id,
        reason = denial.reason,
        "leave action denied"
    );
    denial.into()
}

fn write_error(err: LeaveRepositoryError, interval: LeaveInterval) -> LeaveWorkflowError {
    match err {
        LeaveRepositoryError::OverlappingApproval { existing, .. } => {
            LeaveWorkflowError::SchedulingConflict { interval, existing }
        }
        LeaveRepositoryError::StaleWrite { leave_id, expected } => {
            debug!(%leave_id, expected, "stale write refused");
            LeaveWorkflowError::ConcurrentModification(leave_id)
        }
        other => LeaveWorkflowError::Repository(other),
    }
}
