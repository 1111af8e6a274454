//! Per-commit snapshot generation
//!
//! For each [`CommitRecord`] the working tree is hard-reset to that commit and the
//! external tree tool renders the layout into `NN_<description>.txt`. A failure here
//! only fails that one commit; the driver keeps going.

use crate::error::SnapshotFailure;
use crate::git::{CommitRecord, GitRepo};
use crate::runner::{CommandRunner, display_command};
use std::path::{Path, PathBuf};

/// A snapshot the tree tool reported as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// Absolute path passed to `--to`
    pub path: PathBuf,
    /// Whether the file was found on disk afterwards
    pub verified: bool,
}

/// Renders one snapshot per commit into a fixed output directory
pub struct SnapshotGenerator<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    output_dir: PathBuf,
    exclude_args: Vec<String>,
}

impl<'a, R: CommandRunner + ?Sized> SnapshotGenerator<'a, R> {
    /// `output_dir` must already be absolute; `exclude_args` precede `--to` on every call
    pub fn new(runner: &'a R, output_dir: PathBuf, exclude_args: Vec<String>) -> Self {
        debug_assert!(output_dir.is_absolute(), "output dir must be absolute");
        Self {
            runner,
            output_dir,
            exclude_args,
        }
    }

    /// Absolute path of the snapshot file for `commit`
    pub fn output_path(&self, commit: &CommitRecord) -> PathBuf {
        self.output_dir.join(commit.snapshot_file_name())
    }

    /// Full argument list for the tree tool
    pub fn tree_args(&self, output_path: &Path) -> Vec<String> {
        let mut args = self.exclude_args.clone();
        args.push("--to".to_string());
        args.push(output_path.display().to_string());
        args
    }

    /// Check out `commit` and render its tree.
    ///
    /// Destroys uncommitted changes in the working tree.
    pub fn generate(&self, commit: &CommitRecord) -> Result<SnapshotFile, SnapshotFailure> {
        tracing::info!(
            "Commit #{}: {} - {}",
            commit.index,
            commit.id,
            commit.description
        );

        tracing::debug!("Resetting working tree to {}", commit.id);
        GitRepo::new(self.runner)
            .reset_hard(&commit.id)
            .map_err(|e| {
                tracing::error!("Could not check out commit {}: {}", commit.id, e);
                SnapshotFailure::Checkout(e)
            })?;

        let path = self.output_path(commit);
        let args = self.tree_args(&path);
        let command = display_command(self.runner.tree_program(), &args);
        tracing::debug!("Running: {}", command);

        self.runner
            .run_tree(&args)
            .and_then(|out| out.into_result(command))
            .map_err(|e| {
                tracing::error!("Could not generate tree for {}: {}", commit.id, e);
                SnapshotFailure::Render(e)
            })?;

        let verified = path.exists();
        if verified {
            tracing::info!("  -> {}", commit.snapshot_file_name());
        } else {
            tracing::warn!(
                "Tree tool succeeded but {} was not found",
                path.display()
            );
        }

        Ok(SnapshotFile { path, verified })
    }
}
