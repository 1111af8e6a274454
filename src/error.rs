/// Centralized error types for tree-history using thiserror
///
/// Fatal conditions (environment, history, configuration, interruption) surface as
/// [`SnapshotError`]. Per-commit failures are [`SnapshotFailure`]s that the driver logs
/// and counts without aborting the run.
use std::path::PathBuf;
use thiserror::Error;

/// Exit status used when the run was interrupted by the user (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Main error type for a snapshot run
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to restore {target}: {source}")]
    Restore {
        target: String,
        #[source]
        source: CommandError,
    },

    #[error("Interrupted by user after {processed} of {total} commits")]
    Interrupted { processed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems with the surroundings the driver runs in, detected before anything is mutated
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("Tree tool '{tool}' is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },
}

/// Errors while reading the commit history of the target branch
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to read history of branch '{branch}': {source}")]
    LogFailed {
        branch: String,
        #[source]
        source: CommandError,
    },

    #[error("No commits found on branch '{0}'")]
    NoCommits(String),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Failure of a single external command (git or the tree tool)
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", exit_description(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Why a single commit produced no snapshot
#[derive(Error, Debug)]
pub enum SnapshotFailure {
    /// `git reset --hard` to the commit failed
    #[error("checkout failed: {0}")]
    Checkout(#[source] CommandError),

    /// The tree tool could not be started or exited non-zero
    #[error("tree tool failed: {0}")]
    Render(#[source] CommandError),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl SnapshotError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SnapshotError::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }

    /// True for errors raised before the working tree was touched
    pub fn is_before_mutation(&self) -> bool {
        matches!(
            self,
            SnapshotError::Environment(_) | SnapshotError::History(_) | SnapshotError::Config(_)
        )
    }
}
