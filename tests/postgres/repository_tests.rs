//! Versioned writes and listing through `PostgresLeaveRepository`.

use crate::postgres::helpers::{PostgresDesk, date, desk, runtime};
use eyre::{OptionExt, bail, ensure};
use leaveflow::leave::{
    domain::{LeaveInterval, LeaveReason, LeaveRequest, LeaveStatus, LeaveType, Role, UserId},
    ports::{LeaveFilter, LeaveRepository, LeaveRepositoryError},
};
use mockable::DefaultClock;
use rstest::rstest;
use tokio::runtime::Runtime;

fn submit(
    owner: UserId,
    leave_type: LeaveType,
    start: (u32, u32),
    end: (u32, u32),
) -> eyre::Result<LeaveRequest> {
    Ok(LeaveRequest::submit(
        owner,
        leave_type,
        LeaveInterval::new(date(start.0, start.1), date(end.0, end.1))?,
        LeaveReason::new("Stored leave")?,
        &DefaultClock,
    ))
}

#[rstest]
fn writes_from_an_outdated_copy_are_refused(
    desk: PostgresDesk,
    runtime: Runtime,
) -> eyre::Result<()> {
    let owner = desk.add_user("Dara", Role::Employee, None)?.id();
    let leave = submit(owner, LeaveType::Sick, (4, 1), (4, 2))?;
    let repository = &desk.repository;

    runtime.block_on(async {
        repository.store(&leave).await?;
        let mut fresh = repository
            .find_by_id(leave.id())
            .await?
            .ok_or_eyre("stored request")?;
        let stale = fresh.clone();

        fresh.transition_to(LeaveStatus::Approved, &DefaultClock)?;
        repository.update(&fresh).await?;

        match repository.update(&stale).await {
            Err(LeaveRepositoryError::StaleWrite { expected: 1, .. }) => {}
            other => bail!("expected a stale update to be refused, got {other:?}"),
        }
        match repository.remove(&stale).await {
            Err(LeaveRepositoryError::StaleWrite { expected: 1, .. }) => {}
            other => bail!("expected a stale removal to be refused, got {other:?}"),
        }

        let current = repository
            .find_by_id(leave.id())
            .await?
            .ok_or_eyre("request kept")?;
        ensure!(current.version() == 2, "one write recorded");
        ensure!(current.status() == LeaveStatus::Approved, "approval kept");

        repository.remove(&current).await?;
        ensure!(
            repository.find_by_id(leave.id()).await?.is_none(),
            "current copy removes the request"
        );
        eyre::Ok(())
    })?;

    desk.close()
}

#[rstest]
fn repository_names_the_approval_it_overlaps(
    desk: PostgresDesk,
    runtime: Runtime,
) -> eyre::Result<()> {
    let owner = desk.add_user("Emeka", Role::Employee, None)?.id();
    let mut first = submit(owner, LeaveType::Vacation, (7, 6), (7, 10))?;
    let mut second = submit(owner, LeaveType::Personal, (7, 10), (7, 11))?;
    first.transition_to(LeaveStatus::Approved, &DefaultClock)?;
    second.transition_to(LeaveStatus::Approved, &DefaultClock)?;

    runtime.block_on(async {
        desk.repository.store(&first).await?;
        match desk.repository.store(&second).await {
            Err(LeaveRepositoryError::OverlappingApproval {
                leave_id,
                existing: Some(existing),
            }) if leave_id == second.id() && existing == first.id() => eyre::Ok(()),
            other => bail!("expected an overlap naming the first approval, got {other:?}"),
        }
    })?;

    desk.close()
}

#[rstest]
fn find_many_filters_in_storage_and_lists_newest_first(
    desk: PostgresDesk,
    runtime: Runtime,
) -> eyre::Result<()> {
    let owner = desk.add_user("Fumi", Role::Employee, None)?.id();
    let other = desk.add_user("Goran", Role::Employee, None)?.id();

    // Stored one after another so creation times are distinct.
    let (march, april, sick, elsewhere) = runtime.block_on(async {
        let march = submit(owner, LeaveType::Vacation, (3, 2), (3, 4))?;
        desk.repository.store(&march).await?;
        let april = submit(owner, LeaveType::Vacation, (4, 6), (4, 8))?;
        desk.repository.store(&april).await?;
        let sick = submit(owner, LeaveType::Sick, (4, 7), (4, 7))?;
        desk.repository.store(&sick).await?;
        let elsewhere = submit(other, LeaveType::Vacation, (4, 6), (4, 8))?;
        desk.repository.store(&elsewhere).await?;
        eyre::Ok((march.id(), april.id(), sick.id(), elsewhere.id()))
    })?;

    runtime.block_on(async {
        let mine = desk
            .repository
            .find_many(&LeaveFilter::new().with_owners([owner]))
            .await?;
        let ids: Vec<_> = mine.iter().map(LeaveRequest::id).collect();
        ensure!(
            ids == [sick, april, march],
            "owner filter lists newest first"
        );

        let april_vacations = desk
            .repository
            .find_many(
                &LeaveFilter::new()
                    .with_leave_type(LeaveType::Vacation)
                    .with_window(Some(date(4, 1)), Some(date(4, 30))),
            )
            .await?;
        let ids: Vec<_> = april_vacations.iter().map(LeaveRequest::id).collect();
        ensure!(
            ids == [elsewhere, april],
            "type and window filters apply across owners"
        );

        let approved = desk
            .repository
            .find_many(&LeaveFilter::new().with_status(LeaveStatus::Approved))
            .await?;
        ensure!(approved.is_empty(), "nothing approved yet");
        eyre::Ok(())
    })?;

    desk.close()
}
