//! # tree-history - Directory Tree Snapshots Across Git History
//!
//! Walks the commits of a branch from oldest to newest, checks each one out, and asks an
//! external tree-rendering tool to write the repository layout at that point to a file.
//!
//! ## Overview
//!
//! One snapshot file per commit lands in the output directory, named
//! `NN_<commit subject>.txt` where `NN` is the commit's 1-based position on the branch,
//! zero-padded to two digits. Characters that are not allowed in file names
//! (`< > : " / \ | ? *`) are replaced with `_`.
//!
//! Whatever happens during the walk, the working tree is put back on the branch (and
//! commit) it was on before the run.
//!
//! **Each commit is checked out with `git reset --hard`.** Uncommitted changes are lost;
//! run it on a clean tree or a throwaway clone.
//!
//! ## Architecture
//!
//! ```text
//!   cli + config ──► Driver ──► git::history (git log)
//!                      │
//!                      ├──► snapshot (git reset --hard, tree tool --to)
//!                      │
//!                      └──► git::repo (restore on every exit path)
//!                      ▲
//!               runner::CommandRunner  (SystemRunner / test fakes)
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use tree_history::config::Config;
//! use tree_history::driver::Driver;
//! use tree_history::runner::SystemRunner;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut config = Config::default_for_cwd();
//!     config.history.branch = "develop".to_string();
//!
//!     let runner = SystemRunner::new(&config.repo_dir, config.snapshot.tree_tool.clone());
//!     let summary = Driver::new(config, runner).run()?;
//!     println!("{}/{} commits snapshotted", summary.succeeded, summary.total);
//!     Ok(())
//! }
//! ```

/// Command-line interface definition
pub mod cli;

/// Configuration management with file and environment variable overrides
pub mod config;

/// Orchestration of a full run, including restoration
pub mod driver;

/// Error types and exit codes
pub mod error;

/// Branch history and working-tree operations
pub mod git;

/// Ctrl+C handling
pub mod interrupt;

/// Platform config locations and path helpers
pub mod paths;

/// Process execution seam for git and the tree tool
pub mod runner;

/// Per-commit snapshot generation
pub mod snapshot;
