//! pr-merge: an interactive helper for merging GitHub pull requests.
//!
//! The tool drives a fixed sequence of merge phases (CLA check, fetch the PR
//! as a local branch, rebase-merge, inspect, CI, push) on top of external
//! commands. Destructive steps register reversal tasks with a
//! [`cleanup::CleanupRegistry`]; when a later step fails, the pending tasks
//! are offered to the operator and run in reverse order.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod exec;
pub mod git;
pub mod merge;
pub mod patch;
pub mod phase;
pub mod prompt;
pub mod style;
pub mod types;
