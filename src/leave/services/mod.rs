//! Service layer for leave request workflows.

mod conflict;
mod error;
mod requests;
mod view;
mod workflow;

pub use conflict::ConflictDetector;
pub use error::{LeaveErrorKind, LeaveWorkflowError, LeaveWorkflowResult};
pub use requests::{CreateLeaveRequest, LeaveListQuery, LeavePatch};
pub use view::LeaveView;
pub use workflow::LeaveWorkflowService;
