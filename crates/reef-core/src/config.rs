use serde::{Deserialize, Serialize};

/// Terminal settings loaded from `config.toml`, every field optional.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TerminalConfig {
    /// Completion model used for natural-language translation
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Connect+read timeout for one remote translation request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How many entries the `history` command shows
    #[serde(default = "default_history_display_limit")]
    pub history_display_limit: usize,
    /// Master switch for the remote translator
    #[serde(default = "default_remote_enabled")]
    pub remote_enabled: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            request_timeout_secs: default_request_timeout_secs(),
            history_display_limit: default_history_display_limit(),
            remote_enabled: default_remote_enabled(),
        }
    }
}

fn default_model_name() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_history_display_limit() -> usize {
    10
}

fn default_remote_enabled() -> bool {
    true
}
