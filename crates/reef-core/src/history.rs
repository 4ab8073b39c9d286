//! Session history recording.
//!
//! The recorder is append-only and infallible by design: recording must
//! never take a session down, so there is no update or removal API and
//! `append` cannot fail. The whole history is flushed to the session log
//! exactly once, at teardown.

use serde::{Deserialize, Serialize};

/// One fully-processed input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Timestamp when the line was processed (ISO 8601 format)
    pub timestamp: String,
    /// The raw line as typed
    pub input: String,
    /// Canonical command that was dispatched; `None` marks a line that
    /// never reached dispatch (translation failed)
    pub command: Option<String>,
    /// First line of the user-visible result, success or error text
    pub outcome: String,
    /// Stable error tag on failure, `None` on success
    pub error_kind: Option<String>,
}

impl HistoryEntry {
    /// Entry for a line that dispatched successfully.
    pub fn success(
        timestamp: impl Into<String>,
        input: impl Into<String>,
        command: Option<String>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            input: input.into(),
            command,
            outcome: outcome.into(),
            error_kind: None,
        }
    }

    /// Entry for a line that failed anywhere in the pipeline.
    pub fn failure(
        timestamp: impl Into<String>,
        input: impl Into<String>,
        command: Option<String>,
        outcome: impl Into<String>,
        error_kind: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            input: input.into(),
            command,
            outcome: outcome.into(),
            error_kind: Some(error_kind.into()),
        }
    }

    /// Whether the line failed.
    pub fn is_error(&self) -> bool {
        self.error_kind.is_some()
    }
}

/// Append-only store of everything a session has processed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecorder {
    entries: Vec<HistoryEntry>,
}

impl HistoryRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry. Never fails.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// All entries in arrival order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The last `n` entries in arrival order, for the `history` command.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
