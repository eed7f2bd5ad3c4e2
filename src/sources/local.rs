//! Local sync databases - packages already installed or installable from
//! the system's configured repositories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::PackageRecord;
use crate::repo::Repository;

/// Per-database query surface: exact-name and provides lookups.
pub trait LocalDatabase {
    /// Database name for provenance reporting.
    fn name(&self) -> &str;

    /// Exact-name lookup.
    fn get(&mut self, name: &str) -> Result<Option<PackageRecord>>;

    /// First package whose `provides` covers `name`.
    fn find_provider(&mut self, name: &str) -> Result<Option<PackageRecord>>;
}

/// A sync database backed by a `<name>.db` archive, decoded lazily on the
/// first query and cached for the rest of the run.
pub struct SyncDatabase {
    name: String,
    path: PathBuf,
    loaded: Option<Repository>,
}

impl SyncDatabase {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SyncDatabase {
            name: name.into(),
            path: path.into(),
            loaded: None,
        }
    }

    /// Open the database named `name` under the sync directory.
    pub fn open_dir(dir: &Path, name: &str) -> Self {
        SyncDatabase::new(name, dir.join(format!("{}.db", name)))
    }

    /// A database preloaded with records, for embedding and tests.
    pub fn preloaded(name: impl Into<String>, repository: Repository) -> Self {
        SyncDatabase {
            name: name.into(),
            path: PathBuf::new(),
            loaded: Some(repository),
        }
    }

    fn repository(&mut self) -> Result<&Repository> {
        if self.loaded.is_none() {
            tracing::debug!("loading sync database {}", self.path.display());
            let repository = Repository::load(&self.path)
                .with_context(|| format!("failed to load sync database `{}`", self.name))?;
            self.loaded = Some(repository);
        }
        Ok(self.loaded.as_ref().unwrap())
    }
}

impl LocalDatabase for SyncDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&mut self, name: &str) -> Result<Option<PackageRecord>> {
        Ok(self.repository()?.get(name).cloned())
    }

    fn find_provider(&mut self, name: &str) -> Result<Option<PackageRecord>> {
        let repository = self.repository()?;
        Ok(repository
            .records()
            .into_iter()
            .find(|pkg| pkg.satisfies(name))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with(records: Vec<PackageRecord>) -> SyncDatabase {
        SyncDatabase::preloaded("core", Repository::from_records(records))
    }

    #[test]
    fn test_exact_lookup() {
        let mut db = db_with(vec![PackageRecord::new("zlib", "zlib", "1.3-1")]);
        assert!(db.get("zlib").unwrap().is_some());
        assert!(db.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_find_provider_matches_provides() {
        let mut provider = PackageRecord::new("openssl", "openssl", "3.0-1");
        provider.provides = vec!["libcrypto.so=3".to_string()];
        let mut db = db_with(vec![provider]);

        let found = db.find_provider("libcrypto.so").unwrap().unwrap();
        assert_eq!(found.name, "openssl");
        assert!(db.find_provider("libnope.so").unwrap().is_none());
    }

    #[test]
    fn test_missing_archive_is_an_error() {
        let mut db = SyncDatabase::new("ghost", "/nonexistent/ghost.db");
        assert!(db.get("anything").is_err());
    }
}
