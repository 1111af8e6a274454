/// Configuration system for tree-history
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, SnapshotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Which history to walk
    #[serde(default)]
    pub history: HistoryConfig,

    /// Where snapshots go and how they are rendered
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// How the working tree is put back afterwards
    #[serde(default)]
    pub restore: RestoreConfig,

    /// Repository to operate on
    #[serde(skip)]
    pub repo_dir: PathBuf,
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Branch whose commits are snapshotted
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotConfig {
    /// Output directory, relative to the repository unless absolute
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Path fragments passed to the tree tool's `--exclude`
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Tree tool executable
    #[serde(default = "default_tree_tool")]
    pub tree_tool: String,
}

/// Restore configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestoreConfig {
    /// Branch checked out when neither a branch nor HEAD could be captured
    #[serde(default = "default_fallback_branch")]
    pub fallback_branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tree")
}

/// Build, VCS and dependency directories, plus the default output directory
pub fn default_exclude() -> Vec<String> {
    [
        ".claude",
        ".git",
        ".gradle",
        ".idea",
        "build",
        "dist",
        "node_modules",
        "app/build",
        "tree",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_tree_tool() -> String {
    if cfg!(target_os = "windows") {
        "tree_mine.exe".to_string()
    } else {
        "tree_mine".to_string()
    }
}

fn default_fallback_branch() -> String {
    "main".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            branch: default_branch(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            exclude: default_exclude(),
            tree_tool: default_tree_tool(),
        }
    }
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            fallback_branch: default_fallback_branch(),
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers in effect
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub branch: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub exclude: Option<Vec<String>>,
    pub tree_tool: Option<String>,
    pub fallback_branch: Option<String>,
    pub repo_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;
        config.repo_dir = PathBuf::from(".");

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, SnapshotError> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_path = crate::paths::PlatformPaths::default_config_path();
        if default_path.exists() {
            tracing::info!("Loading config from: {}", default_path.display());
            Self::from_file(&default_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default_for_cwd())
        }
    }

    /// Defaults, operating on the current directory
    pub fn default_for_cwd() -> Self {
        Self {
            repo_dir: PathBuf::from("."),
            ..Self::default()
        }
    }

    /// Validate configuration values.
    ///
    /// Only emptiness is checked; any non-empty branch, path or program name is passed
    /// through to git and the tree tool as-is.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let required = [
            ("history.branch", self.history.branch.is_empty()),
            (
                "snapshot.output_dir",
                self.snapshot.output_dir.as_os_str().is_empty(),
            ),
            ("snapshot.tree_tool", self.snapshot.tree_tool.is_empty()),
            (
                "restore.fallback_branch",
                self.restore.fallback_branch.is_empty(),
            ),
        ];

        for (key, empty) in required {
            if empty {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(branch) = std::env::var("TREE_HISTORY_BRANCH") {
            self.history.branch = branch;
        }

        if let Ok(dir) = std::env::var("TREE_HISTORY_OUTPUT_DIR") {
            self.snapshot.output_dir = PathBuf::from(dir);
        }

        if let Ok(tool) = std::env::var("TREE_HISTORY_TOOL") {
            self.snapshot.tree_tool = tool;
        }

        if let Ok(branch) = std::env::var("TREE_HISTORY_FALLBACK_BRANCH") {
            self.restore.fallback_branch = branch;
        }

        // Comma separated; an empty value clears the list
        if let Ok(exclude) = std::env::var("TREE_HISTORY_EXCLUDE") {
            self.snapshot.exclude = exclude
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Apply command-line values on top of everything else
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(branch) = overrides.branch {
            self.history.branch = branch;
        }
        if let Some(dir) = overrides.output_dir {
            self.snapshot.output_dir = dir;
        }
        if let Some(exclude) = overrides.exclude {
            self.snapshot.exclude = exclude;
        }
        if let Some(tool) = overrides.tree_tool {
            self.snapshot.tree_tool = tool;
        }
        if let Some(branch) = overrides.fallback_branch {
            self.restore.fallback_branch = branch;
        }
        if let Some(dir) = overrides.repo_dir {
            self.repo_dir = dir;
        }
    }

    /// Resolve all layers into a validated configuration
    pub fn resolve(config_path: Option<&Path>, overrides: Overrides) -> Result<Self, SnapshotError> {
        let mut config = Self::load(config_path)?;
        config.apply_env_overrides();
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Arguments for the tree tool that precede `--to`
    pub fn tree_exclude_args(&self) -> Vec<String> {
        if self.snapshot.exclude.is_empty() {
            return Vec::new();
        }
        std::iter::once("--exclude".to_string())
            .chain(self.snapshot.exclude.iter().cloned())
            .collect()
    }

    /// Output directory resolved against the repository directory
    pub fn output_dir(&self) -> PathBuf {
        self.repo_dir.join(&self.snapshot.output_dir)
    }
}
