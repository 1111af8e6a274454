//! Process execution for the two external collaborators: git and the tree tool
//!
//! The driver never spawns processes directly. It goes through [`CommandRunner`], so the
//! orchestration can be exercised against fakes without a real repository or tool binary.

use crate::error::CommandError;
use std::path::PathBuf;
use std::process::Command;

/// Captured result of one finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl CommandOutput {
    /// A successful result with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed result with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Convert a non-zero exit into a [`CommandError`], returning stdout otherwise
    pub fn into_result(self, command: impl Into<String>) -> Result<String, CommandError> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(CommandError::Failed {
                command: command.into(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs git and the tree-snapshot tool on behalf of the driver
pub trait CommandRunner {
    /// Run `git <args>` in the repository directory
    fn run_git(&self, args: &[&str]) -> Result<CommandOutput, CommandError>;

    /// Run the tree tool with `args` in the repository directory
    fn run_tree(&self, args: &[String]) -> Result<CommandOutput, CommandError>;

    /// Program name of the tree tool, used in diagnostics
    fn tree_program(&self) -> &str;
}

/// Render a command line for log output
pub fn display_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut line = program.to_string();
    for arg in args {
        let arg = arg.as_ref();
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// [`CommandRunner`] backed by real processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    repo_dir: PathBuf,
    tree_program: String,
}

impl SystemRunner {
    /// Create a runner executing in `repo_dir`, using `tree_program` as the tree tool
    pub fn new(repo_dir: impl Into<PathBuf>, tree_program: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            tree_program: tree_program.into(),
        }
    }

    fn execute<S: AsRef<str>>(&self, program: &str, args: &[S]) -> Result<CommandOutput, CommandError> {
        let command_line = display_command(program, args);
        tracing::debug!("Running: {}", command_line);

        let output = Command::new(program)
            .args(args.iter().map(|a| a.as_ref()))
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success {
            tracing::debug!(
                "`{}` exited with {:?}: {}",
                command_line,
                result.code,
                result.stderr.trim()
            );
        }

        Ok(result)
    }
}

impl CommandRunner for SystemRunner {
    fn run_git(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.execute("git", args)
    }

    fn run_tree(&self, args: &[String]) -> Result<CommandOutput, CommandError> {
        self.execute(&self.tree_program, args)
    }

    fn tree_program(&self) -> &str {
        &self.tree_program
    }
}
