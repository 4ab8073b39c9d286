//! Command domain module.
//!
//! - `verb`: the fixed command catalog (`Verb`) with aliases and usage strings
//! - `model`: the immutable parsed command (`Command`)
//! - `parse`: line tokenizer with quote and escape support

mod model;
mod parse;
mod verb;

// Re-export public API
pub use model::Command;
pub use parse::{parse_line, tokenize};
pub use verb::Verb;
