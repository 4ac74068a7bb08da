//! Leave request workflows for Leaveflow.
//!
//! This module implements role-scoped access to leave requests, field-level
//! edit permissions, approval transitions, and detection of overlapping
//! approved leave. It follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
