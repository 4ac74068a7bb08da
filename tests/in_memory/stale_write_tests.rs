//! Interleaved writes on one leave request.
//!
//! `GatedRepository` parks the first armed `find_by_id` after it has read
//! its snapshot, so a second actor can write in between.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use super::helpers::{date, register, register_team, vacation};
use async_trait::async_trait;
use eyre::{bail, ensure};
use leaveflow::leave::{
    adapters::memory::{InMemoryLeaveRepository, InMemoryUserDirectory},
    domain::{Actor, LeaveId, LeaveRequest, LeaveStatus, Role, UserId},
    ports::{LeaveFilter, LeaveRepository, LeaveRepositoryResult},
    services::{LeaveErrorKind, LeavePatch, LeaveWorkflowError, LeaveWorkflowService},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use tokio::sync::Notify;

#[derive(Default)]
struct GatedRepository {
    inner: InMemoryLeaveRepository,
    armed: AtomicBool,
    parked: Notify,
    release: Notify,
}

impl GatedRepository {
    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LeaveRepository for GatedRepository {
    async fn store(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        self.inner.store(leave).await
    }

    async fn update(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        self.inner.update(leave).await
    }

    async fn find_by_id(&self, id: LeaveId) -> LeaveRepositoryResult<Option<LeaveRequest>> {
        let found = self.inner.find_by_id(id).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.parked.notify_one();
            self.release.notified().await;
        }
        Ok(found)
    }

    async fn find_many(&self, filter: &LeaveFilter) -> LeaveRepositoryResult<Vec<LeaveRequest>> {
        self.inner.find_many(filter).await
    }

    async fn find_approved_for_user(
        &self,
        user_id: UserId,
    ) -> LeaveRepositoryResult<Vec<LeaveRequest>> {
        self.inner.find_approved_for_user(user_id).await
    }

    async fn remove(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        self.inner.remove(leave).await
    }
}

type GatedService = LeaveWorkflowService<GatedRepository, InMemoryUserDirectory, DefaultClock>;

struct Desk {
    repository: Arc<GatedRepository>,
    service: Arc<GatedService>,
    employee: Actor,
    manager: Actor,
}

#[fixture]
fn desk() -> Desk {
    let directory = InMemoryUserDirectory::new();
    let team = register_team(&directory, "Billing").expect("team insert");
    let employee = register(&directory, "Ines", Role::Employee, Some(team)).expect("user insert");
    let manager = register(&directory, "Kofi", Role::Manager, Some(team)).expect("user insert");
    let repository = Arc::new(GatedRepository::default());
    let service = LeaveWorkflowService::new(
        Arc::clone(&repository),
        Arc::new(directory),
        Arc::new(DefaultClock),
    );
    Desk {
        repository,
        service: Arc::new(service),
        employee,
        manager,
    }
}

/// Runs `first` until it has loaded its snapshot, lets `second` complete,
/// then resumes `first`.
async fn interleave<T, F, S>(desk: &Desk, first: F, second: S) -> eyre::Result<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
    S: Future<Output = Result<(), LeaveWorkflowError>>,
{
    desk.repository.arm();
    let paused = tokio::spawn(first);
    desk.repository.parked.notified().await;
    second.await?;
    desk.repository.release.notify_one();
    Ok(paused.await?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edit_loaded_before_approval_cannot_undo_it(desk: Desk) -> eyre::Result<()> {
    let leave = desk
        .service
        .create(&desk.employee, vacation(date(3, 2), date(3, 6)))
        .await?;

    let edit = {
        let service = Arc::clone(&desk.service);
        let employee = desk.employee;
        async move {
            service
                .update(
                    &employee,
                    leave.id,
                    LeavePatch::new().with_end_date(date(3, 9)),
                )
                .await
        }
    };
    let approval = async {
        desk.service
            .update(
                &desk.manager,
                leave.id,
                LeavePatch::new()
                    .with_status(LeaveStatus::Approved)
                    .with_manager_comment("ok"),
            )
            .await
            .map(drop)
    };

    let outcome = interleave(&desk, edit, approval).await?;
    match outcome {
        Err(err) if err.kind() == LeaveErrorKind::ConcurrentModification => {
            ensure!(err.is_retryable(), "stale edits may be retried");
        }
        other => bail!("expected ConcurrentModification, got {other:?}"),
    }

    let stored = desk.service.get(&desk.manager, leave.id).await?;
    ensure!(stored.status == LeaveStatus::Approved, "approval kept");
    ensure!(stored.end_date == date(3, 6), "stale dates not written");
    ensure!(
        stored.manager_comment.as_deref() == Some("ok"),
        "comment kept"
    );

    // A fresh read sees the approval and is refused by policy instead.
    let retried = desk
        .service
        .update(
            &desk.employee,
            leave.id,
            LeavePatch::new().with_end_date(date(3, 9)),
        )
        .await;
    ensure!(
        retried.is_err_and(|err| err.kind() == LeaveErrorKind::Forbidden),
        "owner cannot edit an approved request"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_loaded_before_approval_leaves_it_in_place(desk: Desk) -> eyre::Result<()> {
    let leave = desk
        .service
        .create(&desk.employee, vacation(date(5, 4), date(5, 5)))
        .await?;

    let cancel = {
        let service = Arc::clone(&desk.service);
        let employee = desk.employee;
        async move { service.delete(&employee, leave.id).await }
    };
    let approval = async {
        desk.service
            .update(
                &desk.manager,
                leave.id,
                LeavePatch::new().with_status(LeaveStatus::Approved),
            )
            .await
            .map(drop)
    };

    let outcome = interleave(&desk, cancel, approval).await?;
    ensure!(
        outcome.is_err_and(|err| err.kind() == LeaveErrorKind::ConcurrentModification),
        "stale delete refused"
    );
    let stored = desk.service.get(&desk.employee, leave.id).await?;
    ensure!(stored.status == LeaveStatus::Approved, "approved request kept");
    Ok(())
}
