//! In-memory integration tests for leave workflow operations.

use std::sync::Arc;

use super::helpers::{TestService, date, register, register_team, service_with, vacation};
use eyre::ensure;
use leaveflow::leave::{
    adapters::memory::InMemoryUserDirectory,
    domain::{Actor, LeaveStatus, LeaveType, Role},
    services::{CreateLeaveRequest, LeaveErrorKind, LeaveListQuery, LeavePatch},
};
use rstest::{fixture, rstest};
use serde_json::json;

struct Office {
    service: Arc<TestService>,
    employee: Actor,
    manager: Actor,
    hr: Actor,
}

#[fixture]
fn office() -> Office {
    let directory = InMemoryUserDirectory::new();
    let team = register_team(&directory, "Support").expect("team insert");
    let employee = register(&directory, "Ezra", Role::Employee, Some(team)).expect("user insert");
    let manager = register(&directory, "Mina", Role::Manager, Some(team)).expect("user insert");
    let hr = register(&directory, "Hugo", Role::Hr, None).expect("user insert");
    Office {
        service: Arc::new(service_with(directory)),
        employee,
        manager,
        hr,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn json_payloads_drive_the_full_lifecycle(office: Office) -> eyre::Result<()> {
    let request: CreateLeaveRequest = serde_json::from_value(json!({
        "type": "personal",
        "startDate": "2026-02-10",
        "endDate": "2026-02-11",
        "reason": "Moving house",
    }))?;
    let created = office.service.create(&office.employee, request).await?;
    ensure!(created.leave_type == LeaveType::Personal, "type parsed");

    let decision: LeavePatch = serde_json::from_value(json!({
        "status": "APPROVED",
        "managerComment": "enjoy",
    }))?;
    let approved = office
        .service
        .update(&office.manager, created.id, decision)
        .await?;

    let body = serde_json::to_value(&approved)?;
    ensure!(body["status"] == "approved", "status serialized: {body}");
    ensure!(body["type"] == "personal", "type key renamed: {body}");
    ensure!(body["userName"] == "Ezra", "owner name present: {body}");
    ensure!(body["teamName"] == "Support", "team name present: {body}");
    ensure!(body["managerComment"] == "enjoy", "comment present: {body}");
    ensure!(body["startDate"] == "2026-02-10", "ISO dates: {body}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_approvals_admit_only_one_overlap(office: Office) -> eyre::Result<()> {
    let first = office
        .service
        .create(&office.employee, vacation(date(3, 1), date(3, 5)))
        .await?;
    let second = office
        .service
        .create(&office.employee, vacation(date(3, 4), date(3, 8)))
        .await?;

    let approve = |id| {
        let service = Arc::clone(&office.service);
        let hr = office.hr;
        tokio::spawn(async move {
            service
                .update(&hr, id, LeavePatch::new().with_status(LeaveStatus::Approved))
                .await
        })
    };
    let (left, right) = tokio::join!(approve(first.id), approve(second.id));
    let outcomes = [left?, right?];

    let approved = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|outcome| {
            outcome
                .as_ref()
                .is_err_and(|err| err.kind() == LeaveErrorKind::SchedulingConflict)
        })
        .count();
    ensure!(approved == 1, "exactly one approval should win");
    ensure!(conflicts == 1, "the other approval should conflict");

    let listed = office
        .service
        .list(
            &office.hr,
            LeaveListQuery::new().with_status(LeaveStatus::Approved),
        )
        .await?;
    ensure!(listed.len() == 1, "one approved request stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_and_pending_requests_never_block_dates(office: Office) -> eyre::Result<()> {
    let rejected = office
        .service
        .create(&office.employee, vacation(date(4, 1), date(4, 5)))
        .await?;
    office
        .service
        .update(
            &office.manager,
            rejected.id,
            LeavePatch::new().with_status(LeaveStatus::Rejected),
        )
        .await?;
    office
        .service
        .create(&office.employee, vacation(date(4, 2), date(4, 3)))
        .await?;

    let overlapping = office
        .service
        .create(&office.employee, vacation(date(4, 3), date(4, 4)))
        .await?;
    let approved = office
        .service
        .update(
            &office.manager,
            overlapping.id,
            LeavePatch::new().with_status(LeaveStatus::Approved),
        )
        .await?;
    ensure!(
        approved.status == LeaveStatus::Approved,
        "pending and rejected requests do not conflict"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_filters_by_type_and_status(office: Office) -> eyre::Result<()> {
    office
        .service
        .create(&office.employee, vacation(date(5, 1), date(5, 1)))
        .await?;
    let sick = office
        .service
        .create(
            &office.employee,
            CreateLeaveRequest::new(LeaveType::Sick, date(5, 2), date(5, 2), "Flu"),
        )
        .await?;

    let only_sick = office
        .service
        .list(
            &office.manager,
            LeaveListQuery::new().with_leave_type(LeaveType::Sick),
        )
        .await?;
    ensure!(
        only_sick.len() == 1 && only_sick.iter().all(|view| view.id == sick.id),
        "type filter applied"
    );

    let none_approved = office
        .service
        .list(
            &office.employee,
            LeaveListQuery::new().with_status(LeaveStatus::Approved),
        )
        .await?;
    ensure!(none_approved.is_empty(), "status filter applied");
    Ok(())
}
