//! Command-line interface
//!
//! Flag names follow the long-standing script interface (`--output_dir` with an
//! underscore); `--output-dir` is accepted too.

use crate::config::Overrides;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Examples:
  tree-history --exclude .git
  tree-history --exclude node_modules dist --output_dir snapshots
  tree-history --branch develop --exclude build

Every commit is checked out with `git reset --hard`, which discards uncommitted
changes. Run it on a clean working tree or a disposable clone.";

/// Version string with the revision and time of the build
pub fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("TREE_HISTORY_GIT_REVISION"),
        ", built ",
        env!("TREE_HISTORY_BUILD_TIMESTAMP"),
        ")"
    )
}

/// Generate a directory-tree snapshot for every commit of a branch
#[derive(Debug, Parser)]
#[command(
    name = "tree-history",
    version,
    long_version = long_version(),
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Directories or files to exclude (default: .claude .git .gradle .idea build dist
    /// node_modules app/build tree). Pass the flag with no values to exclude nothing.
    #[arg(long, num_args = 0.., value_name = "ITEM")]
    pub exclude: Option<Vec<String>>,

    /// Output directory name (default: tree)
    #[arg(long = "output_dir", visible_alias = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Branch to walk (default: main)
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Tree tool executable (default: tree_mine)
    #[arg(long, value_name = "PROGRAM")]
    pub tree_tool: Option<String>,

    /// Repository to operate on (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Branch to check out afterwards if the original checkout could not be detected
    #[arg(long, value_name = "NAME")]
    pub fallback_branch: Option<String>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Command-line values as the top configuration layer
    pub fn overrides(&self) -> Overrides {
        Overrides {
            branch: self.branch.clone(),
            output_dir: self.output_dir.clone(),
            exclude: self.exclude.clone(),
            tree_tool: self.tree_tool.clone(),
            fallback_branch: self.fallback_branch.clone(),
            repo_dir: self.repo.clone(),
        }
    }

    /// Default log filter for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
