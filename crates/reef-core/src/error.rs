//! Error types for the Reef terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Reef workspace.
///
/// Every failure a command can produce is one of these variants, so callers
/// match on structure instead of parsing message strings. The rendered
/// message is what the user sees; [`ReefError::kind`] is the stable tag the
/// history recorder and session log store.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ReefError {
    /// Resolved path would leave the session sandbox
    #[error("Access denied: '{path}' escapes the session sandbox")]
    PathEscape { path: String },

    /// Path does not exist
    #[error("No such file or directory: '{path}'")]
    NotFound { path: String },

    /// Create target already exists
    #[error("Already exists: '{path}'")]
    AlreadyExists { path: String },

    /// Non-recursive removal of a non-empty directory
    #[error("Directory not empty: '{path}' (use 'rmdir -r' to remove contents)")]
    NotEmpty { path: String },

    /// Directory operation on something that is not a directory
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: String },

    /// File operation on a directory
    #[error("Is a directory: '{path}'")]
    IsADirectory { path: String },

    /// File content is not valid UTF-8 text
    #[error("Cannot display '{path}': not valid UTF-8 text")]
    Decode { path: String },

    /// Verb is not in the command catalog
    #[error("Unknown command: '{verb}'")]
    UnknownCommand { verb: String },

    /// Wrong argument shape for a known verb
    #[error("Invalid arguments for '{verb}' (usage: {usage})")]
    Argument { verb: String, usage: String },

    /// Natural-language input that no translation path could resolve
    #[error("Could not understand: '{input}'")]
    UnrecognizedIntent { input: String },

    /// Completion backend unreachable or unusable.
    ///
    /// Internal only: the translator always converts this into a
    /// fallback-rules attempt, it never reaches the user.
    #[error("Remote translator unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    /// Any other OS failure, original message preserved
    #[error("Operation failed: {message}")]
    OperationFailed { message: String },
}

impl ReefError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a PathEscape error
    pub fn path_escape(path: impl Into<String>) -> Self {
        Self::PathEscape { path: path.into() }
    }

    /// Creates a NotFound error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an AlreadyExists error
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Creates a NotEmpty error
    pub fn not_empty(path: impl Into<String>) -> Self {
        Self::NotEmpty { path: path.into() }
    }

    /// Creates a NotADirectory error
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// Creates an IsADirectory error
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory { path: path.into() }
    }

    /// Creates a Decode error
    pub fn decode(path: impl Into<String>) -> Self {
        Self::Decode { path: path.into() }
    }

    /// Creates an UnknownCommand error
    pub fn unknown_command(verb: impl Into<String>) -> Self {
        Self::UnknownCommand { verb: verb.into() }
    }

    /// Creates an Argument error
    pub fn argument(verb: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::Argument {
            verb: verb.into(),
            usage: usage.into(),
        }
    }

    /// Creates an UnrecognizedIntent error
    pub fn unrecognized_intent(input: impl Into<String>) -> Self {
        Self::UnrecognizedIntent {
            input: input.into(),
        }
    }

    /// Creates a RemoteUnavailable error
    pub fn remote_unavailable(reason: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates an OperationFailed error
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }

    /// Maps an OS error onto the taxonomy, attaching the user-visible path.
    ///
    /// Kinds without a dedicated variant become `OperationFailed` with the
    /// original OS message preserved.
    pub fn from_io(err: std::io::Error, path: impl Into<String>) -> Self {
        use std::io::ErrorKind;

        let path = path.into();
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound { path },
            ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            ErrorKind::NotADirectory => Self::NotADirectory { path },
            ErrorKind::IsADirectory => Self::IsADirectory { path },
            ErrorKind::DirectoryNotEmpty => Self::NotEmpty { path },
            ErrorKind::InvalidData => Self::Decode { path },
            _ => Self::OperationFailed {
                message: format!("{} (kind: {:?})", err, err.kind()),
            },
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a PathEscape error
    pub fn is_path_escape(&self) -> bool {
        matches!(self, Self::PathEscape { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an AlreadyExists error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Check if this is a NotEmpty error
    pub fn is_not_empty(&self) -> bool {
        matches!(self, Self::NotEmpty { .. })
    }

    /// Check if this is a RemoteUnavailable error
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }

    /// Check if this is an UnrecognizedIntent error
    pub fn is_unrecognized_intent(&self) -> bool {
        matches!(self, Self::UnrecognizedIntent { .. })
    }

    /// Stable snake_case tag for logs and history entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PathEscape { .. } => "path_escape",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::NotEmpty { .. } => "not_empty",
            Self::NotADirectory { .. } => "not_a_directory",
            Self::IsADirectory { .. } => "is_a_directory",
            Self::Decode { .. } => "decode",
            Self::UnknownCommand { .. } => "unknown_command",
            Self::Argument { .. } => "argument",
            Self::UnrecognizedIntent { .. } => "unrecognized_intent",
            Self::RemoteUnavailable { .. } => "remote_unavailable",
            Self::OperationFailed { .. } => "operation_failed",
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

/// Contextless conversion for call sites without a user-visible path.
///
/// Filesystem operations use [`ReefError::from_io`] instead so the path
/// lands in the message.
impl From<std::io::Error> for ReefError {
    fn from(err: std::io::Error) -> Self {
        Self::OperationFailed {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for ReefError {
    fn from(err: String) -> Self {
        Self::OperationFailed { message: err }
    }
}

/// A type alias for `Result<T, ReefError>`.
pub type Result<T> = std::result::Result<T, ReefError>;
