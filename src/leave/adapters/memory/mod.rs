//! In-memory adapters for the leave ports.

mod directory;
mod leave;

pub use directory::InMemoryUserDirectory;
pub use leave::InMemoryLeaveRepository;
