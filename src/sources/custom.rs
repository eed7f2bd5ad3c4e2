//! The custom repository queried as the lowest-precedence source.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::PackageRecord;
use crate::repo::Repository;

/// Exact-name lookup into the custom repository archive, decoded lazily
/// on the first query.
pub struct CustomRepository {
    path: PathBuf,
    loaded: Option<Repository>,
}

impl CustomRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CustomRepository {
            path: path.into(),
            loaded: None,
        }
    }

    /// A repository already decoded in memory, for embedding and tests.
    pub fn preloaded(repository: Repository) -> Self {
        CustomRepository {
            path: PathBuf::new(),
            loaded: Some(repository),
        }
    }

    pub fn get(&mut self, name: &str) -> Result<Option<PackageRecord>> {
        if self.loaded.is_none() {
            // No archive yet (nothing published) reads as an empty repo.
            if self.path.exists() {
                self.loaded = Some(Repository::load(&self.path)?);
            } else {
                tracing::debug!(
                    "custom repository archive {} not present, treating as empty",
                    self.path.display()
                );
                self.loaded = Some(Repository::empty());
            }
        }

        Ok(self.loaded.as_ref().unwrap().get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preloaded_lookup() {
        let mut repo = CustomRepository::preloaded(Repository::from_records(vec![
            PackageRecord::new("mytool", "mytool", "1.0-1"),
        ]));

        assert!(repo.get("mytool").unwrap().is_some());
        assert!(repo.get("other").unwrap().is_none());
    }

    #[test]
    fn test_missing_archive_reads_as_empty() {
        let mut repo = CustomRepository::new("/nonexistent/repo.db.tar.gz");
        assert!(repo.get("anything").unwrap().is_none());
    }
}
