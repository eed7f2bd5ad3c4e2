//! JSON index rendering for the published repository.

use std::path::Path;

use anyhow::{Context, Result};

use crate::ops::publish::Publisher;
use crate::repo::Repository;

/// Store key and local filename of the rendered index.
pub const INDEX_NAME: &str = "repoPackages.json";

/// Serialize the decoded repository to a JSON array of package records.
pub fn write_index(repository: &Repository, dest: &Path) -> Result<()> {
    let records = repository.records();
    let json =
        serde_json::to_string(&records).context("failed to serialize package index")?;
    crate::util::fs::write_string(dest, &json)
}

/// Decode the repository database from the artifacts directory, render the
/// JSON index next to it, and upload it to the store.
pub fn upload_index(publisher: &Publisher<'_>) -> Result<()> {
    let repository = Repository::load(&publisher.database_path())?;

    let index_path = publisher.artifacts_dir().join(INDEX_NAME);
    write_index(&repository, &index_path)?;

    publisher.store().upload(&index_path, INDEX_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PackageRecord;
    use tempfile::TempDir;

    #[test]
    fn test_write_index() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("repoPackages.json");

        let mut pkg = PackageRecord::new("mytool", "mytool", "1.0-1");
        pkg.desc = "A tool".to_string();
        let repository = Repository::from_records(vec![
            pkg,
            PackageRecord::new("alib", "alib", "2.0-1"),
        ]);

        write_index(&repository, &dest).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dest).unwrap()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        // Sorted by name
        assert_eq!(entries[0]["name"], "alib");
        assert_eq!(entries[1]["name"], "mytool");
        assert_eq!(entries[1]["desc"], "A tool");
    }
}
