//! Natural-language translation into catalog commands.
//!
//! Remote-first: when a completion backend is configured, one request is
//! sent per input line. Every remote failure, including an unusable reply,
//! falls through to the local pattern rules, so the user never sees a
//! remote error. With no backend (or a failing one) translation is a pure
//! function of the input.

use tracing::{debug, warn};

use reef_core::command::{Command, Verb, parse_line};
use reef_core::{ReefError, Result};

use crate::backend::CompletionBackend;
use crate::patterns;

/// Words and phrases that mark a line as plain language rather than a
/// mistyped command.
const INTENT_WORDS: &[&str] = &[
    "create", "make", "delete", "remove", "show", "display", "read", "open",
    "write", "list", "count", "go", "enter", "please", "what", "what's",
    "whats", "where", "how", "can", "could", "files", "folder", "directory",
];

/// Prompt sent to the remote backend. The reply contract is one command
/// line, or the word UNKNOWN.
const INSTRUCTION_TEMPLATE: &str = r#"You are the command parser for a small sandboxed file terminal. Convert the user's request into exactly one of these commands:

ls [DIR]            list directory contents
cd DIR              change the working directory
pwd                 print the working directory
mkdir DIR           create a directory
rmdir [-r] DIR      remove a directory (-r also removes its contents)
touch FILE          create an empty file
rm FILE             delete a file
cat FILE            print a file
echo TEXT > FILE    write TEXT to FILE (>> appends instead)
edit FILE TEXT      replace FILE's content with TEXT
count [DIR]         count files and directories

Rules:
- Reply with the command only. No explanations, no code fences.
- Quote arguments that contain spaces.
- If the request does not map to any command above, reply with exactly: UNKNOWN

Examples:
request: create a file called test.py
reply: touch test.py
request: show me all the files
reply: ls
request: write hello world to greeting.txt
reply: echo "hello world" > greeting.txt
request: how many files are in here
reply: count

request: {input}
reply:"#;

/// Where a translated command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationSource {
    /// The remote completion backend produced the command.
    Remote,
    /// A local fallback rule produced the command; carries the rule name.
    Rule(&'static str),
}

/// A translated command with its provenance.
#[derive(Debug, Clone)]
pub struct Translation {
    pub command: Command,
    pub source: TranslationSource,
}

/// Turns plain-language requests into catalog commands.
pub struct NaturalLanguageTranslator {
    backend: Option<Box<dyn CompletionBackend>>,
}

impl NaturalLanguageTranslator {
    /// Creates a translator that consults `backend` first and the pattern
    /// rules second.
    pub fn new(backend: Option<Box<dyn CompletionBackend>>) -> Self {
        Self { backend }
    }

    /// Creates a translator that only uses the local pattern rules.
    pub fn rules_only() -> Self {
        Self::new(None)
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Name of the configured backend, if any.
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.name())
    }

    /// Translates one input line into a catalog command.
    ///
    /// Returns `UnrecognizedIntent` only when both the remote stage and the
    /// rule table come up empty.
    pub async fn translate(&self, input: &str) -> Result<Translation> {
        if let Some(backend) = &self.backend {
            match remote_translate(backend.as_ref(), input).await {
                Ok(command) => {
                    return Ok(Translation {
                        command,
                        source: TranslationSource::Remote,
                    });
                }
                Err(err) => {
                    warn!(error = %err, "remote translation failed, trying fallback rules");
                }
            }
        }

        if let Some((rule, command)) = patterns::apply_rules(input) {
            debug!(rule, "fallback rule matched");
            return Ok(Translation {
                command,
                source: TranslationSource::Rule(rule),
            });
        }

        Err(ReefError::unrecognized_intent(input))
    }
}

/// Heuristic: does this line read like a request in plain language?
///
/// Single words never qualify. Multi-word lines qualify when any word is a
/// known intent word, so "create a file called x" goes to translation while
/// "gti status" surfaces as an unknown command.
pub fn looks_like_natural_language(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    if lower.split_whitespace().nth(1).is_none() {
        return false;
    }
    lower
        .split_whitespace()
        .any(|word| INTENT_WORDS.contains(&word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')))
}

async fn remote_translate(backend: &dyn CompletionBackend, input: &str) -> Result<Command> {
    let prompt = INSTRUCTION_TEMPLATE.replace("{input}", input.trim());
    let reply = backend.complete(&prompt).await?;
    parse_reply(&reply).ok_or_else(|| {
        ReefError::remote_unavailable(format!("unusable reply: {:?}", first_line(&reply)))
    })
}

/// Parses a backend reply into a catalog command.
///
/// Models decorate: code fences, wrapping quotes and a leading `$` are
/// stripped before parsing. A reply of UNKNOWN, or anything that does not
/// tokenize into a catalog verb, yields `None`.
fn parse_reply(reply: &str) -> Option<Command> {
    let line = strip_wrapping(first_line(reply).trim_start_matches('$').trim());
    if line.eq_ignore_ascii_case("unknown") {
        return None;
    }
    let command = parse_line(line)?;
    Verb::parse(command.verb())?;
    Some(command)
}

/// First non-empty line that is not a code-fence marker.
fn first_line(reply: &str) -> &str {
    reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("```"))
        .unwrap_or("")
}

/// Removes symmetric backtick/quote wrapping. Quotes inside the line, such
/// as a quoted echo argument, are left alone.
fn strip_wrapping(line: &str) -> &str {
    let mut line = line.trim();
    loop {
        match strip_pair(line, '`')
            .or_else(|| strip_pair(line, '"'))
            .or_else(|| strip_pair(line, '\''))
        {
            Some(inner) => line = inner.trim(),
            None => return line,
        }
    }
}

fn strip_pair(line: &str, quote: char) -> Option<&str> {
    let inner = line.strip_prefix(quote)?.strip_suffix(quote)?;
    if inner.is_empty() { None } else { Some(inner) }
}
