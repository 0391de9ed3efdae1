//! Invocation context.
//!
//! Everything an operation needs to know about its environment lives in
//! [`Context`]: where installed packages live, where ephemeral runs are
//! staged, and whether diagnostics are enabled. It is built once in `main`
//! and passed to every operation explicitly.
//!
//! The process working directory is the one piece of global state exc
//! touches. It is only changed through [`WorkingDir`], which puts the
//! previous directory back when dropped.

use std::path::{Path, PathBuf};

/// Overrides the install registry root (default `~/.exc`).
pub const HOME_ENV: &str = "EXC_HOME";

/// Overrides the ephemeral staging root.
pub const STAGING_ENV: &str = "EXC_STAGING_DIR";

#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose diagnostics (`--debug`).
    pub debug: bool,
    /// Root of the install registry.
    pub install_root: PathBuf,
    /// Root under which ephemeral runs are extracted.
    pub staging_root: PathBuf,
}

impl Context {
    pub fn new(debug: bool, install_root: PathBuf, staging_root: PathBuf) -> Self {
        Self {
            debug,
            install_root,
            staging_root,
        }
    }

    /// Resolve roots from `EXC_HOME` / `EXC_STAGING_DIR`, falling back to the
    /// user's home and cache directories.
    pub fn from_env(debug: bool) -> Self {
        let install_root = env_path(HOME_ENV).unwrap_or_else(default_install_root);
        let staging_root = env_path(STAGING_ENV).unwrap_or_else(default_staging_root);

        tracing::debug!(
            install_root = %install_root.display(),
            staging_root = %staging_root.display(),
            "resolved context"
        );

        Self::new(debug, install_root, staging_root)
    }

    /// Change the process working directory to `dir` until the returned guard
    /// is dropped.
    pub fn enter_dir(&self, dir: &Path) -> std::io::Result<WorkingDir> {
        WorkingDir::enter(dir)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn default_install_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".exc")
}

fn default_staging_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("exc").join("staging"))
        .unwrap_or_else(|| PathBuf::from("temp"))
}

/// Scoped working-directory change.
///
/// Restores the directory that was current when the guard was created,
/// whichever way the scope is left.
#[derive(Debug)]
pub struct WorkingDir {
    previous: PathBuf,
}

impl WorkingDir {
    pub fn enter(dir: &Path) -> std::io::Result<Self> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        tracing::debug!(dir = %dir.display(), "entered working directory");
        Ok(Self { previous })
    }

    /// Directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        if let Err(err) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                dir = %self.previous.display(),
                "failed to restore working directory: {err}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn guard_restores_directory() {
        let temp = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        {
            let guard = WorkingDir::enter(temp.path()).unwrap();
            assert_eq!(guard.previous(), before);
            assert_eq!(
                std::env::current_dir().unwrap().canonicalize().unwrap(),
                temp.path().canonicalize().unwrap()
            );
        }

        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn guard_restores_on_error_path() {
        fn fails_inside(dir: &Path) -> std::io::Result<()> {
            let _guard = WorkingDir::enter(dir)?;
            Err(std::io::Error::other("boom"))
        }

        let temp = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        assert!(fails_inside(temp.path()).is_err());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn entering_missing_directory_leaves_cwd_alone() {
        let temp = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        assert!(WorkingDir::enter(&temp.path().join("missing")).is_err());
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn explicit_roots_are_kept() {
        let ctx = Context::new(true, PathBuf::from("/a"), PathBuf::from("/b"));
        assert!(ctx.debug);
        assert_eq!(ctx.install_root, Path::new("/a"));
        assert_eq!(ctx.staging_root, Path::new("/b"));
    }
}
