//! Durable record of the content hash last successfully built per package.
//!
//! The manifest is a flat `package,sha` file with no header, one row per
//! case-folded package key. It is loaded fully into memory per run and
//! rewritten atomically on every update, so a crash can never leave it
//! half-written.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// One row of the manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub package: String,
    pub sha: String,
}

/// The manifest of last-built content hashes.
#[derive(Debug)]
pub struct BuildManifest {
    path: PathBuf,
    entries: Vec<ManifestEntry>,
}

impl BuildManifest {
    /// Load the manifest, creating an empty file when none exists.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    crate::util::fs::ensure_dir(parent)?;
                }
            }
            std::fs::File::create(&path)
                .with_context(|| format!("failed to create manifest: {}", path.display()))?;
        }

        let contents = crate::util::fs::read_to_string(&path)?;
        let mut entries = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let (package, sha) = line.split_once(',').unwrap_or((line, ""));
            entries.push(ManifestEntry {
                package: package.to_string(),
                sha: sha.to_string(),
            });
        }

        Ok(BuildManifest { path, entries })
    }

    /// Hash recorded for `package`, if any. Keys are case-insensitive.
    pub fn check(&self, package: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.package.eq_ignore_ascii_case(package))
            .map(|e| e.sha.as_str())
    }

    /// Whether `package` must be rebuilt for the content hash `sha`: true
    /// when no hash is recorded or the recorded one differs.
    pub fn is_stale(&self, package: &str, sha: &str) -> bool {
        self.check(package) != Some(sha)
    }

    /// Record `sha` as the last-built hash for `package`.
    ///
    /// The whole entry set is written to a temporary file in the
    /// manifest's directory and renamed over the original; a failed
    /// rewrite leaves the prior file intact. At most one entry exists per
    /// case-folded key.
    pub fn update(&mut self, package: &str, sha: &str) -> Result<()> {
        match self
            .entries
            .iter_mut()
            .find(|e| e.package.eq_ignore_ascii_case(package))
        {
            Some(entry) => entry.sha = sha.to_string(),
            None => self.entries.push(ManifestEntry {
                package: package.to_string(),
                sha: sha.to_string(),
            }),
        }

        self.rewrite()
    }

    fn rewrite(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        for entry in &self.entries {
            writeln!(tmp, "{},{}", entry.package, entry.sha)
                .context("failed to write manifest entry")?;
        }

        tmp.persist(&self.path)
            .with_context(|| format!("failed to replace manifest: {}", self.path.display()))?;
        Ok(())
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.csv");

        let manifest = BuildManifest::load(&path).unwrap();
        assert!(path.exists());
        assert!(manifest.entries().is_empty());
    }

    #[test]
    fn test_update_then_check_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = BuildManifest::load(tmp.path().join("manifest.csv")).unwrap();

        manifest.update("mypkg", "abc123").unwrap();
        assert_eq!(manifest.check("mypkg"), Some("abc123"));

        // Persisted across a reload
        let reloaded = BuildManifest::load(tmp.path().join("manifest.csv")).unwrap();
        assert_eq!(reloaded.check("mypkg"), Some("abc123"));
    }

    #[test]
    fn test_check_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = BuildManifest::load(tmp.path().join("manifest.csv")).unwrap();

        manifest.update("MyPkg", "abc").unwrap();
        assert_eq!(manifest.check("mypkg"), Some("abc"));
        assert_eq!(manifest.check("MYPKG"), Some("abc"));
    }

    #[test]
    fn test_update_replaces_existing_entry() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = BuildManifest::load(tmp.path().join("manifest.csv")).unwrap();

        manifest.update("other", "zzz").unwrap();
        manifest.update("mypkg", "first").unwrap();
        manifest.update("mypkg", "second").unwrap();

        assert_eq!(manifest.check("mypkg"), Some("second"));
        // Exactly one row for the key, neighbours untouched
        let reloaded = BuildManifest::load(manifest.path()).unwrap();
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.check("other"), Some("zzz"));
    }

    #[test]
    fn test_is_stale() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = BuildManifest::load(tmp.path().join("manifest.csv")).unwrap();

        assert!(manifest.is_stale("mypkg", "abc"));
        manifest.update("mypkg", "abc").unwrap();
        assert!(!manifest.is_stale("mypkg", "abc"));
        assert!(manifest.is_stale("mypkg", "def"));
    }

    #[test]
    fn test_unrenamed_temp_file_leaves_manifest_intact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.csv");
        let mut manifest = BuildManifest::load(&path).unwrap();
        manifest.update("mypkg", "abc").unwrap();

        let before = std::fs::read(&path).unwrap();

        // A crash between writing the temp file and the rename amounts to
        // a temp file that is written but never persisted.
        {
            let mut tmp_file = NamedTempFile::new_in(tmp.path()).unwrap();
            writeln!(tmp_file, "mypkg,corrupted").unwrap();
            // Dropped without persist()
        }

        let after = std::fs::read(&path).unwrap();
        assert_eq!(before, after);
        let reloaded = BuildManifest::load(&path).unwrap();
        assert_eq!(reloaded.check("mypkg"), Some("abc"));
    }

    #[test]
    fn test_preexisting_rows_survive_updates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manifest.csv");
        std::fs::write(&path, "alpha,111\nbeta,222\n").unwrap();

        let mut manifest = BuildManifest::load(&path).unwrap();
        manifest.update("beta", "333").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "alpha,111\nbeta,333\n");
    }
}
