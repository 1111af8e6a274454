//! Top-level orchestration of a snapshot run
//!
//! ```text
//! INIT -> VALIDATING -> FETCHING_HISTORY -> CREATING_OUTPUT_DIR -> PROCESSING -> RESTORING -> DONE
//! ```
//!
//! Validation and history fetching happen before the working tree is touched; failures
//! there end the run without restoring. From the first mutation on, every exit path,
//! including errors, user interrupts and panics, goes through RESTORING.

use crate::config::Config;
use crate::error::{EnvironmentError, SnapshotError};
use crate::git::{CommitRecord, GitRepo, RestoreTarget, fetch_history};
use crate::interrupt::InterruptFlag;
use crate::paths::PlatformPaths;
use crate::runner::{CommandRunner, display_command};
use crate::snapshot::SnapshotGenerator;
use std::cell::Cell;
use std::path::PathBuf;

/// Where the driver is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Validating,
    FetchingHistory,
    CreatingOutputDir,
    Processing,
    Restoring,
    Done,
}

/// Outcome of a run that reached the end of the commit list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Branch that was walked
    pub branch: String,
    /// Absolute output directory
    pub output_dir: PathBuf,
    /// Number of commits on the branch
    pub total: usize,
    /// Commits whose tree tool invocation succeeded
    pub succeeded: usize,
    /// Ids of commits that failed to check out or render
    pub failed: Vec<String>,
    /// Snapshots reported as written but missing on disk
    pub unverified: Vec<PathBuf>,
    /// Checkout state the working tree was returned to
    pub restored_to: RestoreTarget,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }

    /// One line per kind of problem the run finished with; empty for a clean run
    pub fn warnings(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.failed.is_empty() {
            lines.push(format!(
                "{} commit(s) failed: {}",
                self.failed.len(),
                self.failed.join(", ")
            ));
        }
        if !self.unverified.is_empty() {
            let paths: Vec<String> = self
                .unverified
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            lines.push(format!(
                "{} snapshot(s) reported as written but missing: {}",
                self.unverified.len(),
                paths.join(", ")
            ));
        }
        lines
    }
}

/// Puts the working tree back when dropped, unless [`RestoreGuard::restore`] already did
struct RestoreGuard<'a, R: CommandRunner + ?Sized> {
    repo: GitRepo<'a, R>,
    target: RestoreTarget,
    armed: bool,
}

impl<'a, R: CommandRunner + ?Sized> RestoreGuard<'a, R> {
    fn new(repo: GitRepo<'a, R>, target: RestoreTarget) -> Self {
        Self {
            repo,
            target,
            armed: true,
        }
    }

    fn restore_now(&self) -> Result<(), SnapshotError> {
        if let RestoreTarget::Fallback { name } = &self.target {
            tracing::warn!("No original checkout was captured, restoring to '{}'", name);
        } else {
            tracing::info!("Restoring {}", self.target);
        }

        self.repo.restore(&self.target).map_err(|source| {
            tracing::error!("Failed to restore {}: {}", self.target, source);
            SnapshotError::Restore {
                target: self.target.to_string(),
                source,
            }
        })
    }

    fn restore(mut self) -> Result<RestoreTarget, SnapshotError> {
        self.armed = false;
        self.restore_now()?;
        Ok(self.target.clone())
    }
}

impl<R: CommandRunner + ?Sized> Drop for RestoreGuard<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            // Errors are already logged by restore_now
            let _ = self.restore_now();
        }
    }
}

/// Walks a branch and snapshots every commit
pub struct Driver<R: CommandRunner> {
    config: Config,
    runner: R,
    interrupt: InterruptFlag,
    stage: Cell<Stage>,
}

impl<R: CommandRunner> Driver<R> {
    pub fn new(config: Config, runner: R) -> Self {
        Self {
            config,
            runner,
            interrupt: InterruptFlag::new(),
            stage: Cell::new(Stage::Init),
        }
    }

    /// Use `interrupt` to learn about Ctrl+C
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn stage(&self) -> Stage {
        self.stage.get()
    }

    fn enter(&self, stage: Stage) {
        tracing::debug!("{:?} -> {:?}", self.stage.get(), stage);
        self.stage.set(stage);
    }

    /// Run the whole pipeline.
    ///
    /// Per-commit failures are counted in the summary; only environment, history,
    /// output-directory, interrupt and restore problems are returned as errors.
    pub fn run(&self) -> Result<RunSummary, SnapshotError> {
        self.log_plan();

        self.enter(Stage::Validating);
        self.validate()?;

        let repo = GitRepo::new(&self.runner);
        let target = repo.capture_restore_target(&self.config.restore.fallback_branch);
        tracing::info!("Current checkout: {}", target);

        self.enter(Stage::FetchingHistory);
        let commits = fetch_history(&self.runner, &self.config.history.branch)?;

        let guard = RestoreGuard::new(repo, target);
        let outcome = self.process(&commits);

        self.enter(Stage::Restoring);
        let restored = guard.restore();
        self.enter(Stage::Done);

        let mut summary = outcome?;
        summary.restored_to = restored?;
        Ok(summary)
    }

    fn log_plan(&self) {
        let exclude_args = self.config.tree_exclude_args();
        tracing::info!("Generating directory tree snapshots for every commit");
        tracing::info!("Branch: {}", self.config.history.branch);
        tracing::info!("Output directory: {}", self.config.snapshot.output_dir.display());
        tracing::info!("Excluded: {:?}", self.config.snapshot.exclude);
        tracing::info!(
            "Tree command: {}",
            display_command(self.runner.tree_program(), &exclude_args)
        );
    }

    /// Repository first, then the tree tool
    fn validate(&self) -> Result<(), SnapshotError> {
        if !GitRepo::new(&self.runner).is_repository() {
            tracing::error!(
                "{} is not a git repository",
                self.config.repo_dir.display()
            );
            return Err(EnvironmentError::NotARepository(self.config.repo_dir.clone()).into());
        }

        let tool = self.runner.tree_program().to_string();
        let reason = match self.runner.run_tree(&["--help".to_string()]) {
            Ok(out) if out.success => return Ok(()),
            Ok(out) => format!("`{} --help` exited with {:?}", tool, out.code),
            Err(e) => e.to_string(),
        };

        tracing::error!("Cannot run {}; make sure it is on PATH ({})", tool, reason);
        Err(EnvironmentError::ToolUnavailable { tool, reason }.into())
    }

    fn prepare_output_dir(&self) -> Result<PathBuf, SnapshotError> {
        let dir = PlatformPaths::absolute(&self.config.output_dir())?;

        if dir.is_dir() {
            tracing::info!("Output directory already exists: {}", dir.display());
        } else {
            std::fs::create_dir_all(&dir).inspect_err(|e| {
                tracing::error!("Cannot create output directory {}: {}", dir.display(), e);
            })?;
            tracing::info!("Created output directory: {}", dir.display());
        }

        Ok(dir)
    }

    fn process(&self, commits: &[CommitRecord]) -> Result<RunSummary, SnapshotError> {
        let total = commits.len();
        if self.interrupt.is_set() {
            tracing::warn!("Interrupted by user before the first of {} commits", total);
            return Err(SnapshotError::Interrupted {
                processed: 0,
                total,
            });
        }

        self.enter(Stage::CreatingOutputDir);
        let output_dir = self.prepare_output_dir()?;

        let generator = SnapshotGenerator::new(
            &self.runner,
            output_dir.clone(),
            self.config.tree_exclude_args(),
        );

        self.enter(Stage::Processing);
        let mut summary = RunSummary {
            branch: self.config.history.branch.clone(),
            output_dir,
            total,
            succeeded: 0,
            failed: Vec::new(),
            unverified: Vec::new(),
            restored_to: RestoreTarget::Fallback {
                name: self.config.restore.fallback_branch.clone(),
            },
        };

        for (processed, commit) in commits.iter().enumerate() {
            if self.interrupt.is_set() {
                tracing::warn!("Interrupted by user after {} of {} commits", processed, total);
                return Err(SnapshotError::Interrupted { processed, total });
            }

            match generator.generate(commit) {
                Ok(file) => {
                    summary.succeeded += 1;
                    if !file.verified {
                        summary.unverified.push(file.path);
                    }
                }
                Err(failure) => {
                    tracing::warn!("Commit {} failed: {}", commit.id, failure);
                    summary.failed.push(commit.id.clone());
                }
            }

            tracing::info!("[{}/{}] {} succeeded", processed + 1, total, summary.succeeded);
        }

        // A signal during the last commit should still end the run as interrupted
        if self.interrupt.is_set() {
            tracing::warn!("Interrupted by user after {} of {} commits", total, total);
            return Err(SnapshotError::Interrupted {
                processed: total,
                total,
            });
        }

        tracing::info!(
            "Done! Snapshotted {}/{} commits",
            summary.succeeded,
            summary.total
        );
        Ok(summary)
    }
}
