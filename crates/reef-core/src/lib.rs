pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod outcome;
pub mod session;

// Re-export common types
pub use error::{ReefError, Result};
pub use outcome::{EntryInfo, OperationData, OperationOutcome};
