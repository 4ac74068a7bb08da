//! `PostgreSQL` adapters for leave persistence and directory lookups.
//!
//! All Diesel calls are offloaded to [`tokio::task::spawn_blocking`].

mod directory;
mod models;
mod pool;
mod repository;
mod schema;

pub use directory::PostgresUserDirectory;
pub use pool::{LeavePgPool, build_pool};
pub use repository::PostgresLeaveRepository;
