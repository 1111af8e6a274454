use crate::error::{CommandError, HistoryError};
use crate::runner::{CommandRunner, display_command};
use regex::Regex;
use std::sync::LazyLock;

/// Characters that are not allowed in file names on at least one major platform
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[<>:"/\\|?*]"#).expect("filename character class is a valid regex")
});

/// One commit on the walked branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Abbreviated commit hash as printed by `git log --oneline`
    pub id: String,
    /// First line of the commit message
    pub description: String,
    /// `description` with filename-unsafe characters replaced by `_`
    pub safe_description: String,
    /// 1-based position on the branch, oldest first
    pub index: usize,
}

impl CommitRecord {
    pub fn new(id: impl Into<String>, description: impl Into<String>, index: usize) -> Self {
        let description = description.into();
        Self {
            id: id.into(),
            safe_description: sanitize_description(&description),
            description,
            index,
        }
    }

    /// Name of the snapshot file for this commit, e.g. `03_Add parser.txt`
    pub fn snapshot_file_name(&self) -> String {
        format!("{:02}_{}.txt", self.index, self.safe_description)
    }
}

/// Replace `< > : " / \ | ? *` with underscores
pub fn sanitize_description(description: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(description, "_")
        .into_owned()
}

/// Parse `git log --oneline` output into records numbered from 1.
///
/// Each line is split at its first whitespace run into hash and subject. A commit with an
/// empty message prints as `<hash> ` and is kept with an empty subject; only lines with no
/// separator at all are skipped.
pub fn parse_oneline_log(output: &str) -> Vec<CommitRecord> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let (id, rest) = line.split_once(char::is_whitespace)?;
            let description = rest.trim_start().trim_end_matches(['\r', '\n']);
            Some((id, description))
        })
        .enumerate()
        .map(|(i, (id, description))| CommitRecord::new(id, description, i + 1))
        .collect()
}

/// Arguments for listing `branch` oldest-first, one commit per line
fn log_args(branch: &str) -> [&str; 6] {
    ["log", "--oneline", "--reverse", "--no-decorate", "--no-color", branch]
}

/// Fetch the commits of `branch`, oldest first.
///
/// An empty branch (or empty log output) is reported as [`HistoryError::NoCommits`].
pub fn fetch_history<R: CommandRunner + ?Sized>(
    runner: &R,
    branch: &str,
) -> Result<Vec<CommitRecord>, HistoryError> {
    tracing::info!("Reading commit history of branch '{}'", branch);

    let mut args = log_args(branch).to_vec();
    // Keep a branch name from being read as a path
    args.push("--");
    let command = display_command("git", &args);

    let stdout = runner
        .run_git(&args)
        .and_then(|out| out.into_result(command.clone()))
        .map_err(|source: CommandError| {
            tracing::error!("Failed to read commit history: {}", source);
            HistoryError::LogFailed {
                branch: branch.to_string(),
                source,
            }
        })?;

    let commits = parse_oneline_log(&stdout);
    if commits.is_empty() {
        tracing::error!("No commits found on branch '{}'", branch);
        return Err(HistoryError::NoCommits(branch.to_string()));
    }

    tracing::info!("Found {} commits on '{}'", commits.len(), branch);
    Ok(commits)
}
