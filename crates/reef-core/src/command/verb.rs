//! The fixed command catalog.

use serde::{Deserialize, Serialize};

/// One operation the dispatcher knows how to run.
///
/// Lookup is exact-match and case-insensitive; several verbs carry an alias
/// (`ls`/`dir`, `rm`/`del`, `cat`/`type`) that maps to the same operation.
/// Session-surface commands (`help`, `history`, `exit`, ...) are not verbs:
/// the terminal answers those itself before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    /// List directory entries, directories first
    List,
    /// Create one or more directories
    MakeDir,
    /// Remove an empty directory, or a whole tree with `-r`
    RemoveDir,
    /// Create an empty file or refresh its mtime
    Touch,
    /// Remove one or more files
    RemoveFile,
    /// Print a file as UTF-8 text
    ReadFile,
    /// Echo text, or write it to a file with `>` / `>>`
    Echo,
    /// Overwrite a file with the given text
    Edit,
    /// Count files and directories in a directory
    Count,
    /// Print the session-relative working directory
    Pwd,
    /// Change the working directory within the sandbox
    Cd,
}

impl Verb {
    /// Every verb, in help-screen order.
    pub const ALL: [Verb; 11] = [
        Verb::List,
        Verb::Cd,
        Verb::Pwd,
        Verb::MakeDir,
        Verb::RemoveDir,
        Verb::Touch,
        Verb::RemoveFile,
        Verb::ReadFile,
        Verb::Echo,
        Verb::Edit,
        Verb::Count,
    ];

    /// Resolves a typed verb token against the catalog.
    ///
    /// Matching is case-insensitive; returns `None` for anything outside the
    /// catalog so the caller can raise `UnknownCommand` or try translation.
    pub fn parse(token: &str) -> Option<Verb> {
        match token.to_lowercase().as_str() {
            "ls" | "dir" => Some(Verb::List),
            "mkdir" => Some(Verb::MakeDir),
            "rmdir" => Some(Verb::RemoveDir),
            "touch" => Some(Verb::Touch),
            "rm" | "del" => Some(Verb::RemoveFile),
            "cat" | "type" => Some(Verb::ReadFile),
            "echo" => Some(Verb::Echo),
            "edit" => Some(Verb::Edit),
            "count" => Some(Verb::Count),
            "pwd" => Some(Verb::Pwd),
            "cd" => Some(Verb::Cd),
            _ => None,
        }
    }

    /// Canonical spelling used in history entries and translated commands.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Verb::List => "ls",
            Verb::MakeDir => "mkdir",
            Verb::RemoveDir => "rmdir",
            Verb::Touch => "touch",
            Verb::RemoveFile => "rm",
            Verb::ReadFile => "cat",
            Verb::Echo => "echo",
            Verb::Edit => "edit",
            Verb::Count => "count",
            Verb::Pwd => "pwd",
            Verb::Cd => "cd",
        }
    }

    /// Usage line shown in `Argument` errors and the help screen.
    pub fn usage(&self) -> &'static str {
        match self {
            Verb::List => "ls [DIR]",
            Verb::MakeDir => "mkdir DIR...",
            Verb::RemoveDir => "rmdir [-r] DIR",
            Verb::Touch => "touch FILE...",
            Verb::RemoveFile => "rm FILE...",
            Verb::ReadFile => "cat FILE",
            Verb::Echo => "echo TEXT [> FILE | >> FILE]",
            Verb::Edit => "edit FILE TEXT...",
            Verb::Count => "count [DIR]",
            Verb::Pwd => "pwd",
            Verb::Cd => "cd [DIR]",
        }
    }

    /// One-line description for the help screen.
    pub fn summary(&self) -> &'static str {
        match self {
            Verb::List => "list directory contents (alias: dir)",
            Verb::MakeDir => "create directories",
            Verb::RemoveDir => "remove a directory (-r for non-empty)",
            Verb::Touch => "create empty files or refresh timestamps",
            Verb::RemoveFile => "remove files (alias: del)",
            Verb::ReadFile => "print a file (alias: type)",
            Verb::Echo => "print text or write it to a file",
            Verb::Edit => "replace a file's content",
            Verb::Count => "count files and directories",
            Verb::Pwd => "print the working directory",
            Verb::Cd => "change the working directory",
        }
    }
}
