//! Terminal configuration loading.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use reef_core::config::TerminalConfig;
use reef_core::error::{ReefError, Result};

/// Loads `config.toml` into a [`TerminalConfig`].
///
/// A missing file is not an error, the defaults apply; a file that exists
/// but does not parse is a startup error the caller should surface.
pub async fn load_terminal_config(path: &Path) -> Result<TerminalConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(TerminalConfig::default());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ReefError::from_io(e, path.display().to_string()))?;

    toml::from_str(&content).map_err(|e| {
        ReefError::operation_failed(format!("Failed to parse '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_terminal_config(&temp.path().join("config.toml"))
            .await
            .unwrap();
        assert_eq!(config, TerminalConfig::default());
    }

    #[tokio::test]
    async fn test_partial_file_fills_remaining_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 5\nremote_enabled = false\n").unwrap();

        let config = load_terminal_config(&path).await.unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert!(!config.remote_enabled);
        assert_eq!(config.model_name, TerminalConfig::default().model_name);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = \"not a number\"").unwrap();

        let err = load_terminal_config(&path).await.unwrap_err();
        assert_eq!(err.kind(), "operation_failed");
    }
}
