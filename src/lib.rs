//! Leaveflow: leave request authorization and lifecycle engine.
//!
//! Employees file leave requests, managers decide on their team's requests,
//! and HR may act on any request. The crate enforces role-scoped access,
//! per-field edit permissions, the approval state machine, and the rule that
//! no user holds two overlapping approved requests.
//!
//! # Architecture
//!
//! Leaveflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and the user directory
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Workflow orchestration over the ports
//!
//! # Modules
//!
//! - [`leave`]: Leave requests, authorization, and workflow
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Structured logging setup

pub mod config;
pub mod leave;
pub mod telemetry;
