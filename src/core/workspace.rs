//! Workspace directories for materialized dependencies.

use std::path::{Path, PathBuf};

use anyhow::Result;

/// The directory holding recipe checkouts, one subdirectory per package.
///
/// Checkout directories are created lazily per materialized dependency and
/// never reused across runs; a stale directory left by an earlier attempt
/// is destroyed before the name is handed out again.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a fresh directory for `name`.
    ///
    /// Removes any stale checkout of the same name. The directory itself
    /// is created by whoever populates it (a clone wants the path empty).
    pub fn prepare(&self, name: &str) -> Result<PathBuf> {
        let dest = self.root.join(name);
        if dest.exists() {
            tracing::debug!("removing stale checkout at {}", dest.display());
            crate::util::fs::remove_dir_all_if_exists(&dest)?;
        }
        crate::util::fs::ensure_dir(&self.root)?;
        Ok(dest)
    }
}
