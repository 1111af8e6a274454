/// Platform-specific location of the tree-history config file
///
/// Follows the XDG Base Directory specification on Unix-like systems.
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tree-history";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join("Library/Application Support"))
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
                .unwrap_or_else(|_| PathBuf::from("."))
        }
    }

    /// Returns: {config_dir}/tree-history/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join(APP_DIR_NAME).join("config.toml")
    }

    /// Absolute form of `path`, anchored at the current directory when relative.
    ///
    /// Unlike `canonicalize` this does not require the path to exist.
    pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
        std::path::absolute(path)
    }
}
