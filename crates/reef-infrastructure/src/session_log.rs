//! Session log persistence.
//!
//! One plain-text file per session, written in a single flush at teardown.
//! Fields are debug-quoted so newlines and quotes inside user input cannot
//! break the one-entry-per-line format.

use std::path::PathBuf;

use tokio::fs;
use tracing::info;

use reef_core::error::{ReefError, Result};
use reef_core::history::HistoryRecorder;
use reef_core::session::Session;

/// Writes `session-<id>.log` files under one log directory.
pub struct SessionLogWriter {
    log_dir: PathBuf,
}

impl SessionLogWriter {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    /// Where a session's log lands.
    pub fn log_path(&self, session_id: &str) -> PathBuf {
        self.log_dir.join(format!("session-{session_id}.log"))
    }

    /// Flushes the whole history once and returns the log path.
    ///
    /// Callers treat a failure here as a warning: a session never goes down
    /// because its log could not be written.
    pub async fn flush(&self, session: &Session, history: &HistoryRecorder) -> Result<PathBuf> {
        fs::create_dir_all(&self.log_dir)
            .await
            .map_err(|e| ReefError::from_io(e, self.log_dir.display().to_string()))?;

        let mut content = format!(
            "# reef session {} started {}\n",
            session.id, session.created_at
        );
        for entry in history.entries() {
            content.push_str(&format!("[{}] input={:?}", entry.timestamp, entry.input));
            if let Some(command) = &entry.command {
                content.push_str(&format!(" command={command:?}"));
            }
            if let Some(kind) = &entry.error_kind {
                content.push_str(&format!(" error={kind}"));
            }
            content.push_str(&format!(" outcome={:?}\n", entry.outcome));
        }

        let path = self.log_path(&session.id);
        fs::write(&path, content)
            .await
            .map_err(|e| ReefError::from_io(e, path.display().to_string()))?;

        info!(path = %path.display(), entries = history.len(), "session log flushed");
        Ok(path)
    }
}
