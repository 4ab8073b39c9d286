//! Structured operation results.

use serde::{Deserialize, Serialize};

/// What a successful operation hands back to the caller.
///
/// `message` is the rendered text the terminal prints; `data` carries the
/// structured payload so tests and programmatic consumers never parse the
/// message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub message: String,
    pub data: Option<OperationData>,
}

impl OperationOutcome {
    /// Outcome with a message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    /// Outcome with a message and a structured payload.
    pub fn with_data(message: impl Into<String>, data: OperationData) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Structured payload of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationData {
    /// Directory listing, directories first
    Listing(Vec<EntryInfo>),
    /// Entry counts for one directory
    Counts { files: usize, dirs: usize },
    /// File content
    Text(String),
    /// The session-relative path an operation reported
    Path(String),
    /// Bytes written by a write operation
    BytesWritten(u64),
}

/// One directory entry in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub name: String,
    pub is_dir: bool,
}

impl EntryInfo {
    /// Listing spelling: directories get a trailing slash.
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}
