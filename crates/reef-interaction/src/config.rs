//! API key lookup for the remote translator.
//!
//! The key is read from the environment first (`GEMINI_API_KEY`, then
//! `GOOGLE_API_KEY`), falling back to `~/.config/reef/secret.json`.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use reef_core::{ReefError, Result};
use reef_infrastructure::ReefPaths;

/// Environment variables consulted for the API key, in order.
const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Root structure of secret.json.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini credentials section of secret.json.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Resolves the Gemini API key from the environment or secret.json.
///
/// Returns `Ok(None)` when no key is configured anywhere; the terminal then
/// runs with the local pattern rules only.
pub fn load_api_key() -> Result<Option<String>> {
    if let Some(key) = api_key_from_env() {
        return Ok(Some(key));
    }
    match ReefPaths::secret_file() {
        Ok(path) => api_key_from_file(&path),
        Err(err) => {
            debug!(error = %err, "cannot locate secret.json, skipping");
            Ok(None)
        }
    }
}

fn api_key_from_env() -> Option<String> {
    for var in API_KEY_ENV_VARS {
        if let Ok(value) = env::var(var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                debug!(source = var, "using API key from environment");
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Reads the API key from a secret.json file.
///
/// A missing file yields `Ok(None)`; a file that exists but cannot be
/// parsed is an error. A present but empty `api_key` counts as missing.
pub fn api_key_from_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).map_err(|e| ReefError::from_io(e, path.display().to_string()))?;

    let secret: SecretConfig = serde_json::from_str(&content).map_err(|e| {
        ReefError::operation_failed(format!("Failed to parse '{}': {}", path.display(), e))
    })?;

    Ok(secret
        .gemini
        .map(|gemini| gemini.api_key)
        .filter(|key| !key.trim().is_empty()))
}
