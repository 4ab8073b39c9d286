//! Local fallback rules for natural-language translation.
//!
//! When no remote backend is configured, or a remote request fails, the
//! translator walks this table top to bottom and takes the first rule that
//! matches. Table order is part of the contract: directory rules run before
//! file rules, and specific phrasings run before catch-alls. Matching is
//! case-insensitive; extracted names keep the casing the user typed.

use once_cell::sync::Lazy;
use regex::Regex;

use reef_core::command::Command;

/// A single fallback rule.
///
/// Matchers receive the raw input and a lowercased copy: keywords are
/// checked against the lowered text, names are extracted from the raw text.
pub struct PatternRule {
    /// Stable identifier, shown in traces and used by tests.
    pub name: &'static str,
    matcher: fn(&str, &str) -> Option<Command>,
}

/// Fallback rules in evaluation order. First match wins.
pub static PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        name: "count_entries",
        matcher: match_count_entries,
    },
    PatternRule {
        name: "delete_directory",
        matcher: match_delete_directory,
    },
    PatternRule {
        name: "delete_file",
        matcher: match_delete_file,
    },
    PatternRule {
        name: "create_directory",
        matcher: match_create_directory,
    },
    PatternRule {
        name: "create_file",
        matcher: match_create_file,
    },
    PatternRule {
        name: "write_to_file",
        matcher: match_write_to_file,
    },
    PatternRule {
        name: "read_file",
        matcher: match_read_file,
    },
    PatternRule {
        name: "list_directory",
        matcher: match_list_directory,
    },
    PatternRule {
        name: "change_directory",
        matcher: match_change_directory,
    },
    PatternRule {
        name: "working_directory",
        matcher: match_working_directory,
    },
];

/// Applies the fallback rules to one input line.
///
/// Pure function of the input: the same text always yields the same rule
/// and the same command. Returns the firing rule's name alongside the
/// translated command.
pub fn apply_rules(input: &str) -> Option<(&'static str, Command)> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }
    let lower = raw.to_lowercase();
    PATTERN_RULES
        .iter()
        .find_map(|rule| (rule.matcher)(raw, &lower).map(|command| (rule.name, command)))
}

// ============================================================================
// Rules
// ============================================================================

fn match_count_entries(_raw: &str, lower: &str) -> Option<Command> {
    if lower.contains("how many") || has_word(lower, "count") {
        return Some(Command::new("count", Vec::new()));
    }
    None
}

fn match_delete_directory(raw: &str, lower: &str) -> Option<Command> {
    if !has_any_word(lower, &["delete", "remove"]) {
        return None;
    }
    if !has_any_word(lower, &["folder", "folders", "directory", "directories"]) {
        return None;
    }
    let target = extract_target(raw, lower)?;
    Some(Command::new("rmdir", vec![target]))
}

fn match_delete_file(raw: &str, lower: &str) -> Option<Command> {
    if !has_any_word(lower, &["delete", "remove"]) {
        return None;
    }
    let target = extract_target(raw, lower)?;
    Some(Command::new("rm", vec![target]))
}

fn match_create_directory(raw: &str, lower: &str) -> Option<Command> {
    if !has_any_word(lower, &["create", "make"]) {
        return None;
    }
    if !has_any_word(lower, &["folder", "folders", "directory", "directories"]) {
        return None;
    }
    let target = extract_target(raw, lower)?;
    Some(Command::new("mkdir", vec![target]))
}

fn match_create_file(raw: &str, lower: &str) -> Option<Command> {
    if !has_any_word(lower, &["create", "make"]) {
        return None;
    }
    // The directory rule runs first, so any create intent left here targets
    // a file. Still require a file signal: the word "file", a name after
    // "named"/"called", or a dotted token.
    let named = target_after_marker(raw, lower);
    if named.is_none() && !has_word(lower, "file") && dotted_target(raw).is_none() {
        return None;
    }
    let target = named.or_else(|| extract_target(raw, lower))?;
    Some(Command::new("touch", vec![with_extension_hint(target, lower)]))
}

static WRITE_TO_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:please\s+)?write\s+(.+?)\s+(?:to|in|into)\s+(?:the\s+)?(?:file\s+)?(\S+)\s*$")
        .unwrap()
});

fn match_write_to_file(raw: &str, _lower: &str) -> Option<Command> {
    let captures = WRITE_TO_FILE.captures(raw)?;
    let text = captures
        .get(1)?
        .as_str()
        .trim()
        .trim_matches(&['"', '\''][..]);
    let file = clean_token(captures.get(2)?.as_str());
    if text.is_empty() || file.is_empty() {
        return None;
    }
    Some(Command::new(
        "echo",
        vec![text.to_string(), ">".to_string(), file.to_string()],
    ))
}

fn match_read_file(raw: &str, lower: &str) -> Option<Command> {
    let wants_reading = has_any_word(lower, &["read", "show", "display", "open"])
        || lower.contains("what's in")
        || lower.contains("what is in");
    if !wants_reading {
        return None;
    }
    // Needs a concrete file name; "show me all files" belongs to the list
    // rule below.
    let target = dotted_target(raw).or_else(|| target_after_marker(raw, lower))?;
    Some(Command::new("cat", vec![target]))
}

fn match_list_directory(_raw: &str, lower: &str) -> Option<Command> {
    let wants_listing = has_word(lower, "list")
        || lower.contains("what's here")
        || lower.contains("what is here")
        || (has_any_word(lower, &["show", "display", "see", "view"])
            && has_any_word(
                lower,
                &["files", "contents", "everything", "folders", "directories"],
            ));
    if wants_listing {
        return Some(Command::new("ls", Vec::new()));
    }
    None
}

static CHANGE_DIRECTORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:go\s+(?:to|into)|enter|step\s+into|open\s+(?:the\s+)?folder)\s+(?:the\s+)?(?:folder\s+|directory\s+)?(\S+)",
    )
    .unwrap()
});

fn match_change_directory(raw: &str, _lower: &str) -> Option<Command> {
    let captures = CHANGE_DIRECTORY.captures(raw)?;
    let target = clean_token(captures.get(1)?.as_str());
    if target.is_empty()
        || matches!(target.to_lowercase().as_str(), "folder" | "directory" | "the")
    {
        return None;
    }
    Some(Command::new("cd", vec![target.to_string()]))
}

fn match_working_directory(_raw: &str, lower: &str) -> Option<Command> {
    if lower.contains("where am i")
        || lower.contains("current directory")
        || lower.contains("current folder")
        || lower.contains("working directory")
    {
        return Some(Command::new("pwd", Vec::new()));
    }
    None
}

// ============================================================================
// Extraction helpers
// ============================================================================

/// Words that describe a target without naming one. A line whose only
/// remaining words are fillers has no extractable name.
const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "it", "me", "all", "my", "some", "new",
    "file", "files", "folder", "folders", "directory", "directories",
    "everything", "here", "there", "please", "can", "you", "could", "now",
    "create", "make", "delete", "remove", "show", "read", "display", "open",
    "list", "count", "write", "go", "to", "into", "in", "of", "enter",
    "named", "called", "contents", "current", "empty",
];

/// Language words mapped to extensions, for requests like
/// "create a python file called scratch".
const EXTENSION_HINTS: &[(&str, &str)] = &[
    ("python", ".py"),
    ("rust", ".rs"),
    ("javascript", ".js"),
    ("java", ".java"),
    ("html", ".html"),
    ("css", ".css"),
    ("markdown", ".md"),
    ("text", ".txt"),
];

const EDGE_PUNCTUATION: &[char] = &['"', '\'', ',', '!', '?', ':', ';', '(', ')'];

/// Strips quotes and sentence punctuation from a token's edges. Interior
/// dots survive, so "notes.txt." cleans to "notes.txt".
fn clean_token(token: &str) -> &str {
    token
        .trim_end_matches('.')
        .trim_matches(EDGE_PUNCTUATION)
        .trim_end_matches('.')
}

fn has_word(lower: &str, word: &str) -> bool {
    lower.split_whitespace().any(|token| clean_token(token) == word)
}

fn has_any_word(lower: &str, words: &[&str]) -> bool {
    words.iter().any(|word| has_word(lower, word))
}

/// The raw token following "named" or "called", if any.
fn target_after_marker(raw: &str, lower: &str) -> Option<String> {
    let lower_tokens: Vec<&str> = lower.split_whitespace().collect();
    let raw_tokens: Vec<&str> = raw.split_whitespace().collect();
    let position = lower_tokens
        .iter()
        .position(|token| matches!(clean_token(token), "named" | "called"))?;
    let candidate = clean_token(raw_tokens.get(position + 1)?);
    if candidate.is_empty() {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// The first token that looks like a file name (contains a dot).
fn dotted_target(raw: &str) -> Option<String> {
    raw.split_whitespace().find_map(|token| {
        let cleaned = clean_token(token);
        if cleaned.contains('.') && cleaned.len() > 1 {
            Some(cleaned.to_string())
        } else {
            None
        }
    })
}

/// Extracts the most likely target name from the line.
///
/// A name after "named"/"called" wins; otherwise the last word that is not
/// a filler word. Returns `None` when nothing concrete remains, so the rule
/// fails instead of guessing.
fn extract_target(raw: &str, lower: &str) -> Option<String> {
    if let Some(name) = target_after_marker(raw, lower) {
        return Some(name);
    }
    raw.split_whitespace().rev().find_map(|token| {
        let cleaned = clean_token(token);
        if cleaned.is_empty() || FILLER_WORDS.contains(&cleaned.to_lowercase().as_str()) {
            None
        } else {
            Some(cleaned.to_string())
        }
    })
}

/// Appends an extension for "python file"-style hints when the name has
/// none of its own.
fn with_extension_hint(target: String, lower: &str) -> String {
    if target.contains('.') {
        return target;
    }
    for (language, extension) in EXTENSION_HINTS {
        if has_word(lower, language) {
            return format!("{}{}", target, extension);
        }
    }
    target
}
