//! Exhaustive checks that listing and reading agree with role scope.

use super::helpers::{date, register, register_team, service_with, vacation};
use eyre::ensure;
use leaveflow::leave::{
    adapters::memory::InMemoryUserDirectory,
    domain::{LeaveStatus, Role, TeamId},
    services::{LeaveErrorKind, LeaveListQuery, LeavePatch},
};
use rstest::rstest;

/// Owner of the record relative to the viewer.
#[derive(Debug, Clone, Copy)]
enum Owner {
    Viewer,
    SameTeam,
    OtherTeam,
    NoTeam,
}

fn owner_team(owner: Owner, viewer_team: Option<TeamId>, other: TeamId) -> Option<TeamId> {
    match owner {
        Owner::Viewer | Owner::SameTeam => viewer_team,
        Owner::OtherTeam => Some(other),
        Owner::NoTeam => None,
    }
}

fn expected_visible(role: Role, owner: Owner, viewer_team: Option<TeamId>) -> bool {
    match (role, owner) {
        (Role::Hr, _) | (_, Owner::Viewer) => true,
        (Role::Manager, Owner::SameTeam) => viewer_team.is_some(),
        _ => false,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_and_get_never_leak_outside_scope(
    #[values(Role::Employee, Role::Manager, Role::Hr)] role: Role,
    #[values(true, false)] viewer_has_team: bool,
    #[values(Owner::Viewer, Owner::SameTeam, Owner::OtherTeam, Owner::NoTeam)] owner: Owner,
    #[values(LeaveStatus::Pending, LeaveStatus::Approved, LeaveStatus::Rejected)]
    status: LeaveStatus,
) -> eyre::Result<()> {
    let directory = InMemoryUserDirectory::new();
    let home = register_team(&directory, "Home")?;
    let away = register_team(&directory, "Away")?;
    let viewer_team = viewer_has_team.then_some(home);
    let viewer = register(&directory, "Viewer", role, viewer_team)?;
    let hr = register(&directory, "Auditor", Role::Hr, None)?;
    let author = match owner {
        Owner::Viewer => viewer,
        _ => register(
            &directory,
            "Owner",
            Role::Employee,
            owner_team(owner, viewer_team, away),
        )?,
    };
    let service = service_with(directory);

    let leave = service
        .create(&author, vacation(date(6, 1), date(6, 2)))
        .await?;
    if status != LeaveStatus::Pending {
        service
            .update(&hr, leave.id, LeavePatch::new().with_status(status))
            .await?;
    }

    let expected = expected_visible(role, owner, viewer_team);
    let listed = service.list(&viewer, LeaveListQuery::new()).await?;
    let in_list = listed.iter().any(|view| view.id == leave.id);
    ensure!(
        in_list == expected,
        "{role} list visibility for {owner:?} should be {expected}"
    );
    ensure!(
        listed.iter().all(|view| view.user_id == viewer.id() || role != Role::Employee),
        "employee list holds only own requests"
    );

    let read = service.get(&viewer, leave.id).await;
    match (expected, read) {
        (true, Ok(view)) => ensure!(view.id == leave.id, "read returns the request"),
        (false, Err(err)) => ensure!(
            err.kind() == LeaveErrorKind::Forbidden,
            "read outside scope is forbidden, got {err}"
        ),
        (_, other) => eyre::bail!("read disagrees with list: {other:?}"),
    }
    Ok(())
}
