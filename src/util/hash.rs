//! Hashing utilities for content hashes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Content hash of a recipe directory.
///
/// Hashes relative paths and file contents in sorted order, so the result
/// is stable across filesystems. `.git` metadata is excluded. Used as the
/// fallback content hash for recipes that are not tracked as submodules.
pub fn sha256_dir(root: &Path) -> Result<String> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    let mut hasher = Sha256::new();
    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        let contents = std::fs::read(&path)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        hasher.update(&contents);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sha256_bytes() {
        assert_eq!(
            sha256_bytes(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_dir_is_stable() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("PKGBUILD"), "pkgname=foo").unwrap();
        std::fs::create_dir(tmp.path().join("patches")).unwrap();
        std::fs::write(tmp.path().join("patches/fix.patch"), "--- a\n+++ b\n").unwrap();

        let first = sha256_dir(tmp.path()).unwrap();
        let second = sha256_dir(tmp.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sha256_dir_detects_changes() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("PKGBUILD"), "pkgname=foo").unwrap();

        let before = sha256_dir(tmp.path()).unwrap();
        std::fs::write(tmp.path().join("PKGBUILD"), "pkgname=bar").unwrap();
        let after = sha256_dir(tmp.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_sha256_dir_ignores_git_metadata() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("PKGBUILD"), "pkgname=foo").unwrap();

        let before = sha256_dir(tmp.path()).unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        std::fs::write(tmp.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        let after = sha256_dir(tmp.path()).unwrap();
        assert_eq!(before, after);
    }
}
