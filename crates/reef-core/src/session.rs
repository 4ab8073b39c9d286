//! Session domain model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One terminal session bound to one sandbox root.
///
/// `cwd` is kept relative to `root` (empty means the root itself) so that
/// history entries and user-visible paths never leak where the sandbox
/// actually lives on the host. The invariant is that `root.join(cwd)` names
/// an existing directory inside the sandbox; `cd` is the only mutation and
/// the dispatcher revalidates the target before committing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Absolute path of the sandbox root directory
    pub root: PathBuf,
    /// Working directory relative to `root`; empty means the root
    pub cwd: PathBuf,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
}

impl Session {
    /// Creates a session rooted at an already-existing sandbox directory.
    pub fn new(root: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            root,
            cwd: PathBuf::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The absolute path of the current working directory.
    pub fn working_dir(&self) -> PathBuf {
        self.root.join(&self.cwd)
    }

    /// Renders `cwd` for prompts and `pwd`: `/`, `/project`, `/project/src`.
    pub fn cwd_display(&self) -> String {
        if self.cwd.as_os_str().is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.cwd.display())
        }
    }

    /// Commits a new working directory. The caller has already resolved and
    /// validated `rel` against the sandbox.
    pub fn set_cwd(&mut self, rel: impl AsRef<Path>) {
        self.cwd = rel.as_ref().to_path_buf();
    }
}
