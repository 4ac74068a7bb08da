//! Shared helpers for `PostgreSQL` integration tests.

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text, Uuid as SqlUuid};
use leaveflow::{
    config::StoreConfig,
    leave::{
        adapters::postgres::{
            LeavePgPool, PostgresLeaveRepository, PostgresUserDirectory, build_pool,
        },
        domain::{Actor, LeaveType, Role, TeamId, UserId},
        services::{CreateLeaveRequest, LeaveWorkflowService},
    },
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{
    BootstrapResult, TemporaryDatabase, TestCluster,
    test_support::{hash_directory, shared_test_cluster},
};
use rstest::fixture;
use tokio::runtime::{Builder, Runtime};

/// Team and user tables.
const CREATE_DIRECTORY_SQL: &str =
    include_str!("../../migrations/2026-01-11-000000_create_directory/up.sql");

/// Leave requests with the overlap exclusion constraint.
const CREATE_LEAVE_REQUESTS_SQL: &str =
    include_str!("../../migrations/2026-01-12-000000_create_leave_requests/up.sql");

/// Service type wired to the `PostgreSQL` adapters.
pub type PostgresService =
    LeaveWorkflowService<PostgresLeaveRepository, PostgresUserDirectory, DefaultClock>;

/// A migrated database of its own, with adapters and a service over it.
pub struct PostgresDesk {
    /// Leave repository over the test database.
    pub repository: Arc<PostgresLeaveRepository>,
    /// Directory over the test database.
    pub directory: Arc<PostgresUserDirectory>,
    /// Workflow service sharing the repository and directory.
    pub service: Arc<PostgresService>,
    /// Pool the adapters draw from, for raw statements in tests.
    pub pool: LeavePgPool,
    database: TemporaryDatabase,
}

impl PostgresDesk {
    /// Connection URL of the test database.
    #[must_use]
    pub fn url(&self) -> &str {
        self.database.url()
    }

    /// Inserts a team row.
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    pub fn add_team(&self, name: &str) -> eyre::Result<TeamId> {
        let id = TeamId::new();
        let mut connection = self.pool.get()?;
        diesel::sql_query("INSERT INTO teams (id, name) VALUES ($1, $2)")
            .bind::<SqlUuid, _>(id.into_inner())
            .bind::<Text, _>(name)
            .execute(&mut connection)?;
        Ok(id)
    }

    /// Inserts a user row and returns the actor they act as.
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    pub fn add_user(
        &self,
        name: &str,
        role: Role,
        team_id: Option<TeamId>,
    ) -> eyre::Result<Actor> {
        let id = UserId::new();
        let mut connection = self.pool.get()?;
        diesel::sql_query("INSERT INTO users (id, name, role, team_id) VALUES ($1, $2, $3, $4)")
            .bind::<SqlUuid, _>(id.into_inner())
            .bind::<Text, _>(name)
            .bind::<Text, _>(role.as_str())
            .bind::<Nullable<SqlUuid>, _>(team_id.map(TeamId::into_inner))
            .execute(&mut connection)?;
        Ok(Actor::new(id, role, team_id))
    }

    /// Drops the adapters and the test database.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be dropped.
    pub fn close(self) -> eyre::Result<()> {
        let Self {
            repository,
            directory,
            service,
            pool,
            database,
        } = self;
        drop(service);
        drop(repository);
        drop(directory);
        drop(pool);
        database.force_drop()?;
        Ok(())
    }
}

/// Opens a fresh database on the shared cluster.
///
/// # Panics
///
/// Panics with a `SKIP-TEST-CLUSTER` prefix when the database cannot be
/// prepared.
#[fixture]
pub fn desk(shared_test_cluster: &'static TestCluster) -> PostgresDesk {
    match open_desk(shared_test_cluster) {
        Ok(desk) => desk,
        Err(err) => panic!("SKIP-TEST-CLUSTER: leave database setup failed: {err:?}"),
    }
}

/// Builds the runtime the async adapters run on.
///
/// # Panics
///
/// Panics when the runtime cannot be built.
#[fixture]
pub fn runtime() -> Runtime {
    Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("tokio runtime")
}

fn open_desk(cluster: &TestCluster) -> eyre::Result<PostgresDesk> {
    let template = template_name()?;
    cluster.ensure_template_exists(template.as_str(), |db_name| {
        apply_migrations(cluster, db_name)
    })?;
    let database = cluster.temporary_database_from_template(
        format!("leave_{}", uuid::Uuid::new_v4().simple()),
        template.as_str(),
    )?;

    let pool = build_pool(&StoreConfig {
        database_url: database.url().to_owned(),
        max_connections: 6,
        connect_timeout: Duration::from_secs(10),
    })?;
    let repository = Arc::new(PostgresLeaveRepository::new(pool.clone()));
    let directory = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let service = Arc::new(LeaveWorkflowService::new(
        Arc::clone(&repository),
        Arc::clone(&directory),
        Arc::new(DefaultClock),
    ));
    Ok(PostgresDesk {
        repository,
        directory,
        service,
        pool,
        database,
    })
}

/// Template name keyed on the migration contents, so edited migrations
/// never reuse a stale template.
fn template_name() -> BootstrapResult<String> {
    let hash = hash_directory("migrations")?;
    Ok(format!(
        "leaveflow_template_{}",
        hash.chars().take(12).collect::<String>()
    ))
}

fn apply_migrations(cluster: &TestCluster, db_name: &str) -> BootstrapResult<()> {
    let mut connection = cluster.connection().diesel_connection(db_name)?;
    connection
        .batch_execute(CREATE_DIRECTORY_SQL)
        .map_err(eyre::Report::new)?;
    connection
        .batch_execute(CREATE_LEAVE_REQUESTS_SQL)
        .map_err(eyre::Report::new)?;
    Ok(())
}

/// Returns a 2026 calendar date.
///
/// # Panics
///
/// Panics when the month/day pair is not a valid date.
#[must_use]
pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).expect("valid 2026 date")
}

/// Vacation request covering `start..=end`.
#[must_use]
pub fn vacation(start: NaiveDate, end: NaiveDate) -> CreateLeaveRequest {
    CreateLeaveRequest::new(LeaveType::Vacation, start, end, "Integration leave")
}
