//! Session sandbox: root directory lifecycle and path resolution.
//!
//! Every filesystem effect of a session happens under one root directory.
//! The sandbox owns that root (a fresh temp dir by default, or a caller
//! supplied directory), resolves user paths into it, and removes it at
//! teardown. Resolution is purely lexical so that paths which do not exist
//! yet can still be validated; for paths that do exist, a canonicalize
//! check catches symlinks that would tunnel out of the root.

use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tokio::fs;
use tracing::debug;

use reef_core::error::{ReefError, Result};

/// The sandbox a session runs in.
pub struct Sandbox {
    /// Canonicalized absolute path of the root directory
    root: PathBuf,
    /// Guard for ephemeral roots; `None` when the caller supplied the root
    temp: Option<TempDir>,
}

impl Sandbox {
    /// Creates a sandbox in a fresh temporary directory.
    ///
    /// The directory is removed at [`Sandbox::teardown`] (or on drop), unless
    /// [`Sandbox::persist`] disarms removal first.
    pub async fn ephemeral() -> Result<Self> {
        let temp = tempfile::Builder::new().prefix("reef-").tempdir()?;
        // Canonicalize once so containment checks compare like with like
        // (macOS tempdirs live behind the /var -> /private/var symlink).
        let root = fs::canonicalize(temp.path()).await?;
        debug!(root = %root.display(), "created ephemeral sandbox");
        Ok(Self {
            root,
            temp: Some(temp),
        })
    }

    /// Creates a sandbox rooted at a caller-supplied directory.
    ///
    /// The directory is created if missing and is never removed at teardown.
    pub async fn at_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ReefError::from_io(e, dir.display().to_string()))?;
        let root = fs::canonicalize(&dir)
            .await
            .map_err(|e| ReefError::from_io(e, dir.display().to_string()))?;
        debug!(root = %root.display(), "opened sandbox at existing directory");
        Ok(Self { root, temp: None })
    }

    /// The absolute sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether teardown will remove the root.
    pub fn is_ephemeral(&self) -> bool {
        self.temp.is_some()
    }

    /// Resolves a user-typed path to an absolute path inside the sandbox.
    ///
    /// `cwd` is the session's working directory relative to the root. The
    /// result is not required to exist.
    pub fn resolve(&self, cwd: &Path, raw: &str) -> Result<PathBuf> {
        Ok(self.root.join(self.resolve_relative(cwd, raw)?))
    }

    /// Resolves a user-typed path to a root-relative path.
    ///
    /// Purely lexical: `.` components drop, `..` components pop, and popping
    /// above the root is a `PathEscape` for this one operation. Absolute
    /// inputs are rejected outright, there is no absolute-path override
    /// into or out of the sandbox.
    pub fn resolve_relative(&self, cwd: &Path, raw: &str) -> Result<PathBuf> {
        let requested = Path::new(raw);
        if requested.is_absolute() {
            return Err(ReefError::path_escape(raw));
        }

        let mut stack: Vec<std::ffi::OsString> = cwd
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_os_string()),
                _ => None,
            })
            .collect();

        for component in requested.components() {
            match component {
                Component::Normal(part) => stack.push(part.to_os_string()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if stack.pop().is_none() {
                        return Err(ReefError::path_escape(raw));
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(ReefError::path_escape(raw));
                }
            }
        }

        Ok(stack.iter().collect())
    }

    /// Verifies that a resolved path still lies under the root once symlinks
    /// are followed.
    ///
    /// Lexical resolution cannot see a symlink planted inside the sandbox
    /// (only possible with a pre-seeded `at_dir` root), so operations call
    /// this before touching anything. The check canonicalizes the deepest
    /// existing ancestor, which also covers targets that do not exist yet.
    pub fn verify_containment(&self, resolved: &Path, raw: &str) -> Result<()> {
        let mut probe = resolved;
        loop {
            if probe.exists() {
                let canonical = probe
                    .canonicalize()
                    .map_err(|e| ReefError::from_io(e, raw.to_string()))?;
                if !canonical.starts_with(&self.root) {
                    return Err(ReefError::path_escape(raw));
                }
                return Ok(());
            }
            match probe.parent() {
                Some(parent) => probe = parent,
                // Ran out of components without finding the root; treat as
                // an escape rather than trusting the path.
                None => return Err(ReefError::path_escape(raw)),
            }
        }
    }

    /// Disarms removal: the root directory survives teardown and drop.
    pub fn persist(&mut self) {
        if let Some(temp) = self.temp.take() {
            let _ = temp.keep();
        }
    }

    /// Removes the root directory if this sandbox owns it.
    ///
    /// Idempotent: a second call, or a call after the root is already gone,
    /// is a no-op. Caller-supplied roots are never removed.
    pub async fn teardown(&mut self) -> Result<()> {
        if let Some(temp) = self.temp.take() {
            debug!(root = %self.root.display(), "removing sandbox root");
            temp.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_resolve_relative_to_cwd() {
        let sandbox = Sandbox::ephemeral().await.unwrap();

        let at_root = sandbox.resolve(Path::new(""), "notes.txt").unwrap();
        assert_eq!(at_root, sandbox.root().join("notes.txt"));

        let nested = sandbox.resolve(Path::new("project"), "src/main.rs").unwrap();
        assert_eq!(nested, sandbox.root().join("project/src/main.rs"));
    }

    #[tokio::test]
    async fn test_resolve_collapses_dot_and_dotdot() {
        let sandbox = Sandbox::ephemeral().await.unwrap();

        let path = sandbox
            .resolve(Path::new("project"), "./src/../docs/readme.md")
            .unwrap();
        assert_eq!(path, sandbox.root().join("project/docs/readme.md"));

        // `..` from a subdirectory lands on the root, which is fine
        let path = sandbox.resolve(Path::new("project"), "..").unwrap();
        assert_eq!(path, sandbox.root());
    }

    #[tokio::test]
    async fn test_resolve_rejects_escape_above_root() {
        let sandbox = Sandbox::ephemeral().await.unwrap();

        let err = sandbox.resolve(Path::new(""), "../outside.txt").unwrap_err();
        assert!(err.is_path_escape());

        let err = sandbox
            .resolve(Path::new("project"), "../../etc/passwd")
            .unwrap_err();
        assert!(err.is_path_escape());
    }

    #[tokio::test]
    async fn test_resolve_rejects_absolute_paths() {
        let sandbox = Sandbox::ephemeral().await.unwrap();
        let err = sandbox.resolve(Path::new(""), "/etc/passwd").unwrap_err();
        assert!(err.is_path_escape());
    }

    #[tokio::test]
    async fn test_resolve_relative_for_cd() {
        let sandbox = Sandbox::ephemeral().await.unwrap();

        let rel = sandbox
            .resolve_relative(Path::new("project"), "../other")
            .unwrap();
        assert_eq!(rel, PathBuf::from("other"));

        let rel = sandbox.resolve_relative(Path::new("project"), "..").unwrap();
        assert_eq!(rel, PathBuf::new());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_verify_containment_blocks_symlink_out() {
        let outside = TempDir::new().unwrap();
        let outside_file = outside.path().join("outside.txt");
        std::fs::write(&outside_file, "secret").unwrap();

        let sandbox = Sandbox::ephemeral().await.unwrap();
        let link = sandbox.root().join("sneaky.txt");
        std::os::unix::fs::symlink(&outside_file, &link).unwrap();

        let resolved = sandbox.resolve(Path::new(""), "sneaky.txt").unwrap();
        let err = sandbox.verify_containment(&resolved, "sneaky.txt").unwrap_err();
        assert!(err.is_path_escape());
    }

    #[tokio::test]
    async fn test_verify_containment_accepts_new_paths() {
        let sandbox = Sandbox::ephemeral().await.unwrap();
        let resolved = sandbox.resolve(Path::new(""), "not/yet/created.txt").unwrap();
        assert!(sandbox.verify_containment(&resolved, "not/yet/created.txt").is_ok());
    }

    #[tokio::test]
    async fn test_teardown_removes_root_and_is_idempotent() {
        let mut sandbox = Sandbox::ephemeral().await.unwrap();
        let root = sandbox.root().to_path_buf();
        assert!(root.exists());

        sandbox.teardown().await.unwrap();
        assert!(!root.exists());

        // Second call is a no-op
        sandbox.teardown().await.unwrap();
    }

    #[tokio::test]
    async fn test_teardown_keeps_caller_supplied_root() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("workspace");

        let mut sandbox = Sandbox::at_dir(&dir).await.unwrap();
        assert!(dir.exists());
        assert!(!sandbox.is_ephemeral());

        sandbox.teardown().await.unwrap();
        assert!(dir.exists());
    }

    #[tokio::test]
    async fn test_persist_disarms_removal() {
        let mut sandbox = Sandbox::ephemeral().await.unwrap();
        let root = sandbox.root().to_path_buf();

        sandbox.persist();
        sandbox.teardown().await.unwrap();
        assert!(root.exists());

        // Clean up after ourselves since removal was disarmed
        std::fs::remove_dir_all(&root).unwrap();
    }
}
