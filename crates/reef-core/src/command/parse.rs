//! Command-line tokenizer.

use super::Command;

/// Parses one input line into a [`Command`].
///
/// Returns `None` for blank lines. The first token becomes the verb, the
/// rest become arguments in order; there is no command chaining and no
/// flag expansion, the catalog's only flag (`rmdir -r`) stays a plain token
/// for the dispatcher to interpret.
pub fn parse_line(input: &str) -> Option<Command> {
    let mut tokens = tokenize(input.trim());
    if tokens.is_empty() {
        return None;
    }

    let verb = tokens.remove(0);
    Some(Command::new(verb, tokens))
}

/// Tokenizes a raw command string into individual arguments.
///
/// Supports:
/// - Single quotes (`'`): everything inside is literal.
/// - Double quotes (`"`): backslash escaping for `"` and `\`.
/// - Backslash escapes (`\`): outside quotes, escapes any following character.
/// - Whitespace: separates tokens unless escaped or quoted.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            current.push_str(&handle_escape(c, in_double_quote));
            escaped = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escaped = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if !current.is_empty() {
                    tokens.push(current.clone());
                    current.clear();
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Backslash escape rules.
///
/// Inside double quotes only `"` and `\` lose their special meaning; other
/// characters keep the backslash. Outside quotes the next char is literal.
fn handle_escape(c: char, in_double_quote: bool) -> String {
    if in_double_quote {
        match c {
            '"' | '\\' => c.to_string(),
            _ => format!("\\{}", c),
        }
    } else {
        c.to_string()
    }
}
