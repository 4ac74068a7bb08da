//! Connection pool construction and blocking-call helpers.

use crate::config::StoreConfig;
use crate::leave::ports::{DirectoryError, LeaveRepositoryError};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};

/// `PostgreSQL` connection pool type used by the leave adapters.
pub type LeavePgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool from configuration.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot open its initial connections.
pub fn build_pool(config: &StoreConfig) -> Result<LeavePgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(config.connect_timeout)
        .build(manager)
}

/// Port errors that can wrap an infrastructure failure.
pub(super) trait PersistenceFailure: Send + 'static {
    fn persistence_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

impl PersistenceFailure for LeaveRepositoryError {
    fn persistence_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl PersistenceFailure for DirectoryError {
    fn persistence_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

/// Runs a Diesel closure with a pooled connection on the blocking thread
/// pool so the async executor is never blocked.
pub(super) async fn run_blocking<F, T, E>(pool: &LeavePgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: PersistenceFailure,
{
    let shared = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = shared.get().map_err(E::persistence_failure)?;
        f(&mut connection)
    })
    .await
    .map_err(E::persistence_failure)?
}
