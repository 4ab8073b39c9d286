//! The parsed command model.

use serde::{Deserialize, Serialize};

/// A parsed command line: one verb plus its ordered arguments.
///
/// The verb is stored lowercased but otherwise unresolved; the dispatcher
/// performs the catalog lookup so that unknown verbs surface as
/// `UnknownCommand` there, with the token the user actually typed.
/// A `Command` is immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    verb: String,
    args: Vec<String>,
}

impl Command {
    /// Creates a command from a verb token and its arguments.
    pub fn new(verb: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            verb: verb.into().to_lowercase(),
            args,
        }
    }

    /// The lowercased verb token.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// The ordered arguments, quotes already stripped.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Re-joins verb and arguments for display and history entries.
    ///
    /// Arguments containing whitespace are re-quoted so the canonical line
    /// parses back to the same command.
    pub fn canonical_line(&self) -> String {
        let mut line = self.verb.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.chars().any(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}
