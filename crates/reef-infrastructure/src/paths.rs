//! Unified path management for reef configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/reef/              # Config directory
//! ├── config.toml              # Terminal configuration
//! └── secret.json              # API keys
//!
//! ~/.local/share/reef/         # Data directory
//! └── logs/                    # Session logs
//!     └── session-<id>.log
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for reef.
///
/// Paths follow the platform conventions reported by the `dirs` crate
/// (XDG on Linux, the usual locations on macOS and Windows).
pub struct ReefPaths;

impl ReefPaths {
    /// Returns the reef configuration directory (e.g. `~/.config/reef/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("reef"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the reef data directory (e.g. `~/.local/share/reef/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_local_dir()
            .map(|dir| dir.join("reef"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the directory session logs are flushed into.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
