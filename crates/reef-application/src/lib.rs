//! Application layer for REEF.
//!
//! This crate coordinates the domain and infrastructure layers: the
//! dispatcher maps parsed commands onto sandbox filesystem operations, and
//! the terminal drives whole sessions line by line.

pub mod dispatcher;
pub mod terminal;

pub use terminal::{Terminal, TerminalReply};
