pub mod config_loader;
pub mod fs_ops;
pub mod paths;
pub mod sandbox;
pub mod session_log;

// Re-export the pieces the application layer wires together
pub use paths::ReefPaths;
pub use sandbox::Sandbox;
pub use session_log::SessionLogWriter;
