//! `PostgreSQL` repository implementation for leave request storage.
//!
//! Writes run inside a transaction holding a per-owner advisory lock, so the
//! approved-overlap check and the write are serialized for each user. The
//! `leave_requests_no_overlapping_approvals` exclusion constraint backs the
//! same rule at the schema level. Updates and removals lock the target row
//! and compare its `version` with the one the caller read.

use super::{
    models::{LeaveChangeset, LeaveRow, NewLeaveRow},
    pool::{LeavePgPool, run_blocking},
    schema::leave_requests,
};
use crate::leave::{
    domain::{
        LeaveId, LeaveInterval, LeaveReason, LeaveRequest, LeaveStatus, LeaveType,
        PersistedLeaveData, UserId, find_conflict,
    },
    ports::{LeaveFilter, LeaveRepository, LeaveRepositoryError, LeaveRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const OVERLAP_CONSTRAINT: &str = "leave_requests_no_overlapping_approvals";

/// `PostgreSQL`-backed leave repository.
#[derive(Debug, Clone)]
pub struct PostgresLeaveRepository {
    pool: LeavePgPool,
}

impl PostgresLeaveRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LeavePgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRepository for PostgresLeaveRepository {
    async fn store(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        let candidate = leave.clone();
        let new_row = to_new_row(leave);

        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, LeaveRepositoryError, _>(|tx| {
                lock_owner(tx, candidate.user_id())?;
                ensure_no_overlap(tx, &candidate)?;

                diesel::insert_into(leave_requests::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| classify_write_error(err, candidate.id(), true))?;
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        let candidate = leave.clone();
        let changeset = to_changeset(leave);

        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, LeaveRepositoryError, _>(|tx| {
                lock_owner(tx, candidate.user_id())?;
                ensure_current(tx, &candidate)?;
                ensure_no_overlap(tx, &candidate)?;

                let target = leave_requests::table.find(candidate.id().into_inner());
                let affected = diesel::update(target)
                    .set(&changeset)
                    .execute(tx)
                    .map_err(|err| classify_write_error(err, candidate.id(), false))?;
                if affected == 0 {
                    return Err(LeaveRepositoryError::NotFound(candidate.id()));
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: LeaveId) -> LeaveRepositoryResult<Option<LeaveRequest>> {
        run_blocking(&self.pool, move |connection| {
            let row = leave_requests::table
                .find(id.into_inner())
                .select(LeaveRow::as_select())
                .first::<LeaveRow>(connection)
                .optional()
                .map_err(LeaveRepositoryError::persistence)?;
            row.map(row_to_leave).transpose()
        })
        .await
    }

    async fn find_many(&self, filter: &LeaveFilter) -> LeaveRepositoryResult<Vec<LeaveRequest>> {
        let criteria = filter.clone();
        run_blocking(&self.pool, move |connection| {
            let mut query: leave_requests::BoxedQuery<'static, Pg> =
                leave_requests::table.into_boxed();
            if let Some(owners) = criteria.owners() {
                let ids: Vec<uuid::Uuid> = owners.iter().copied().map(UserId::into_inner).collect();
                query = query.filter(leave_requests::user_id.eq_any(ids));
            }
            if let Some(status) = criteria.status() {
                query = query.filter(leave_requests::status.eq(status.as_str()));
            }
            if let Some(leave_type) = criteria.leave_type() {
                query = query.filter(leave_requests::leave_type.eq(leave_type.as_str()));
            }
            if let Some(from) = criteria.from() {
                query = query.filter(leave_requests::end_date.ge(from));
            }
            if let Some(to) = criteria.to() {
                query = query.filter(leave_requests::start_date.le(to));
            }

            let rows = query
                .order((leave_requests::created_at.desc(), leave_requests::id.asc()))
                .select(LeaveRow::as_select())
                .load::<LeaveRow>(connection)
                .map_err(LeaveRepositoryError::persistence)?;
            rows.into_iter().map(row_to_leave).collect()
        })
        .await
    }

    async fn find_approved_for_user(
        &self,
        user_id: UserId,
    ) -> LeaveRepositoryResult<Vec<LeaveRequest>> {
        run_blocking(&self.pool, move |connection| {
            load_approved(connection, user_id)
        })
        .await
    }

    async fn remove(&self, leave: &LeaveRequest) -> LeaveRepositoryResult<()> {
        let candidate = leave.clone();
        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, LeaveRepositoryError, _>(|tx| {
                ensure_current(tx, &candidate)?;
                diesel::delete(leave_requests::table.find(candidate.id().into_inner()))
                    .execute(tx)
                    .map_err(LeaveRepositoryError::persistence)?;
                Ok(())
            })
        })
        .await
    }
}

impl From<DieselError> for LeaveRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Serializes writes for one owner until the surrounding transaction ends.
fn lock_owner(connection: &mut PgConnection, user_id: UserId) -> LeaveRepositoryResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind::<diesel::sql_types::Text, _>(user_id.to_string())
        .execute(connection)
        .map_err(LeaveRepositoryError::persistence)?;
    Ok(())
}

/// Locks the target row and checks it is still at the version `candidate`
/// was read at.
fn ensure_current(
    connection: &mut PgConnection,
    candidate: &LeaveRequest,
) -> LeaveRepositoryResult<()> {
    let stored = leave_requests::table
        .find(candidate.id().into_inner())
        .select(leave_requests::version)
        .for_update()
        .first::<i64>(connection)
        .optional()
        .map_err(LeaveRepositoryError::persistence)?
        .ok_or(LeaveRepositoryError::NotFound(candidate.id()))?;
    if stored != i64::from(candidate.version()) {
        return Err(LeaveRepositoryError::StaleWrite {
            leave_id: candidate.id(),
            expected: candidate.version(),
        });
    }
    Ok(())
}

fn load_approved(
    connection: &mut PgConnection,
    user_id: UserId,
) -> LeaveRepositoryResult<Vec<LeaveRequest>> {
    let rows = leave_requests::table
        .filter(leave_requests::user_id.eq(user_id.into_inner()))
        .filter(leave_requests::status.eq(LeaveStatus::Approved.as_str()))
        .select(LeaveRow::as_select())
        .load::<LeaveRow>(connection)
        .map_err(LeaveRepositoryError::persistence)?;
    rows.into_iter().map(row_to_leave).collect()
}

fn ensure_no_overlap(
    connection: &mut PgConnection,
    candidate: &LeaveRequest,
) -> LeaveRepositoryResult<()> {
    if !candidate.is_approved() {
        return Ok(());
    }
    let approved = load_approved(connection, candidate.user_id())?;
    find_conflict(candidate.interval(), &approved, Some(candidate.id())).map_or(
        Ok(()),
        |existing| {
            Err(LeaveRepositoryError::OverlappingApproval {
                leave_id: candidate.id(),
                existing: Some(existing.id()),
            })
        },
    )
}

fn classify_write_error(
    err: DieselError,
    leave_id: LeaveId,
    inserting: bool,
) -> LeaveRepositoryError {
    match err {
        DieselError::DatabaseError(_, ref info) if is_overlap_violation(info.as_ref()) => {
            LeaveRepositoryError::OverlappingApproval {
                leave_id,
                existing: None,
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) if inserting => {
            LeaveRepositoryError::DuplicateLeave(leave_id)
        }
        _ => LeaveRepositoryError::persistence(err),
    }
}

fn is_overlap_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == OVERLAP_CONSTRAINT)
}

pub(super) fn to_new_row(leave: &LeaveRequest) -> NewLeaveRow {
    NewLeaveRow {
        id: leave.id().into_inner(),
        user_id: leave.user_id().into_inner(),
        leave_type: leave.leave_type().as_str().to_owned(),
        status: leave.status().as_str().to_owned(),
        start_date: leave.interval().start(),
        end_date: leave.interval().end(),
        reason: leave.reason().as_str().to_owned(),
        manager_comment: leave.manager_comment().map(str::to_owned),
        created_at: leave.created_at(),
        updated_at: leave.updated_at(),
        version: i64::from(leave.version()),
    }
}

pub(super) fn to_changeset(leave: &LeaveRequest) -> LeaveChangeset {
    LeaveChangeset {
        leave_type: leave.leave_type().as_str().to_owned(),
        status: leave.status().as_str().to_owned(),
        start_date: leave.interval().start(),
        end_date: leave.interval().end(),
        reason: leave.reason().as_str().to_owned(),
        manager_comment: leave.manager_comment().map(str::to_owned),
        updated_at: leave.updated_at(),
        version: i64::from(leave.version()).saturating_add(1),
    }
}

pub(super) fn row_to_leave(row: LeaveRow) -> LeaveRepositoryResult<LeaveRequest> {
    let LeaveRow {
        id,
        user_id,
        leave_type: persisted_type,
        status: persisted_status,
        start_date,
        end_date,
        reason: persisted_reason,
        manager_comment,
        created_at,
        updated_at,
        version: persisted_version,
    } = row;

    let leave_type =
        LeaveType::try_from(persisted_type.as_str()).map_err(LeaveRepositoryError::persistence)?;
    let status = LeaveStatus::try_from(persisted_status.as_str())
        .map_err(LeaveRepositoryError::persistence)?;
    let interval =
        LeaveInterval::new(start_date, end_date).map_err(LeaveRepositoryError::persistence)?;
    let reason = LeaveReason::new(persisted_reason).map_err(LeaveRepositoryError::persistence)?;
    let version = u32::try_from(persisted_version)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            LeaveRepositoryError::persistence(std::io::Error::other(format!(
                "leave request {id} has invalid version {persisted_version}"
            )))
        })?;

    Ok(LeaveRequest::from_persisted(PersistedLeaveData {
        id: LeaveId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        leave_type,
        status,
        interval,
        reason,
        manager_comment,
        created_at,
        updated_at,
        version,
    }))
}
