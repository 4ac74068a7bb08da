//! Port contracts for the leave workflow.
//!
//! Ports define infrastructure-agnostic interfaces used by leave services.

pub mod directory;
pub mod repository;

pub use directory::{DirectoryError, DirectoryResult, UserDirectory};
pub use repository::{LeaveFilter, LeaveRepository, LeaveRepositoryError, LeaveRepositoryResult};
