//! Domain model for leave requests.
//!
//! The leave domain models the request aggregate and its approval state
//! machine, the inclusive-date overlap rule, and the role-scoped
//! authorization policy. Lookups and persistence stay outside the domain
//! boundary.

mod actor;
mod conflict;
mod error;
mod ids;
mod interval;
mod leave;
mod policy;

pub use actor::{Actor, Role, Team, UserProfile};
pub use conflict::find_conflict;
pub use error::{LeaveDomainError, ParseLeaveStatusError, ParseLeaveTypeError, ParseRoleError};
pub use ids::{LeaveId, LeaveReason, TeamId, UserId};
pub use interval::LeaveInterval;
pub use leave::{LeaveRequest, LeaveRevision, LeaveStatus, LeaveType, PersistedLeaveData};
pub use policy::{
    Action, Capability, Decision, FieldSet, LeaveField, LeaveTarget, ListScope, PolicyDenial,
    RecordScope, authorize, capability, editable_fields,
};
