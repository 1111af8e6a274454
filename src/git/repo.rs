use crate::error::CommandError;
use crate::runner::{CommandRunner, display_command};
use std::fmt;

/// Checkout state to return to once the walk is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    /// A branch was checked out. `head` is the commit it pointed at, used to undo the
    /// hard resets performed while walking history.
    Branch { name: String, head: Option<String> },
    /// HEAD was detached at this commit
    Detached { commit: String },
    /// Nothing could be captured; check out this branch instead
    Fallback { name: String },
}

impl fmt::Display for RestoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreTarget::Branch { name, .. } => write!(f, "branch '{}'", name),
            RestoreTarget::Detached { commit } => write!(f, "detached HEAD at {}", commit),
            RestoreTarget::Fallback { name } => write!(f, "fallback branch '{}'", name),
        }
    }
}

/// Thin typed layer over the git commands the driver needs
pub struct GitRepo<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> GitRepo<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Run git and return trimmed stdout, failing on non-zero exit
    fn git(&self, args: &[&str]) -> Result<String, CommandError> {
        let command = display_command("git", args);
        let stdout = self.runner.run_git(args)?.into_result(command)?;
        Ok(stdout.trim().to_string())
    }

    /// `git status` succeeds only inside a working tree
    pub fn is_repository(&self) -> bool {
        match self.git(&["status"]) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("git status failed: {}", e);
                false
            }
        }
    }

    /// Name of the checked-out branch, `None` on a detached HEAD or failure
    pub fn current_branch(&self) -> Option<String> {
        match self.git(&["branch", "--show-current"]) {
            Ok(name) if !name.is_empty() => Some(name),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Could not determine current branch: {}", e);
                None
            }
        }
    }

    /// Full hash of HEAD, `None` when the repository has no commits
    pub fn head_commit(&self) -> Option<String> {
        self.git(&["rev-parse", "HEAD"])
            .ok()
            .filter(|hash| !hash.is_empty())
    }

    /// Capture where the working tree should end up after the run
    pub fn capture_restore_target(&self, fallback_branch: &str) -> RestoreTarget {
        let head = self.head_commit();
        match (self.current_branch(), head) {
            (Some(name), head) => RestoreTarget::Branch { name, head },
            (None, Some(commit)) => RestoreTarget::Detached { commit },
            (None, None) => {
                tracing::warn!(
                    "No current branch or HEAD commit detected, will restore to '{}'",
                    fallback_branch
                );
                RestoreTarget::Fallback {
                    name: fallback_branch.to_string(),
                }
            }
        }
    }

    /// `git reset --hard <commit>`, discarding working-tree modifications
    pub fn reset_hard(&self, commit: &str) -> Result<(), CommandError> {
        self.git(&["reset", "--hard", commit]).map(|_| ())
    }

    /// `git checkout <name>`
    pub fn checkout(&self, name: &str) -> Result<(), CommandError> {
        self.git(&["checkout", name]).map(|_| ())
    }

    /// Return the working tree to `target`
    pub fn restore(&self, target: &RestoreTarget) -> Result<(), CommandError> {
        match target {
            RestoreTarget::Branch { name, head } => {
                self.checkout(name)?;
                if let Some(head) = head {
                    self.reset_hard(head)?;
                }
                Ok(())
            }
            RestoreTarget::Detached { commit } => self.checkout(commit),
            RestoreTarget::Fallback { name } => self.checkout(name),
        }
    }
}
