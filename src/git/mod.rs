//! Git operations for walking a branch's history
//!
//! Everything goes through the `git` command line via [`crate::runner::CommandRunner`]
//! rather than a library binding, so the working tree is mutated exactly as a user
//! running the same commands would see it.

/// Branch history listing and commit record parsing
pub mod history;
/// Repository state queries, checkout/reset and restoration
pub mod repo;

pub use history::{CommitRecord, fetch_history, sanitize_description};
pub use repo::{GitRepo, RestoreTarget};
