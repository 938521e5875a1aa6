//! The merge workflow.
//!
//! Split the same way the rest of the crate separates concerns:
//! - `message` - pure commit-message rewriting (testable, no I/O)
//! - `phases` - the fixed phase definitions and their rendered commands
//! - `orchestrator` - the effectful phase state machine

mod message;
mod orchestrator;
mod phases;

pub use message::rewrite_commit_message;
pub use orchestrator::MergeOrchestrator;
pub use phases::phase_list;
