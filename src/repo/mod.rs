//! Custom repository archives.
//!
//! A repository is a gzip-compressed tar archive whose members are the
//! metadata blocks of the published packages, one block per package, in
//! the format decoded by [`decode`].

pub mod decode;

pub use decode::{decode_package, DecodeError, RawEntry};

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

use crate::core::PackageRecord;

/// Decoded view of one repository archive: package name to record.
#[derive(Debug, Default)]
pub struct Repository {
    entries: HashMap<String, PackageRecord>,
}

impl Repository {
    /// An empty repository.
    pub fn empty() -> Repository {
        Repository::default()
    }

    /// Build a repository from records, last write wins on duplicate names.
    pub fn from_records(records: impl IntoIterator<Item = PackageRecord>) -> Repository {
        let mut repository = Repository::default();
        for record in records {
            repository.entries.insert(record.name.clone(), record);
        }
        repository
    }

    /// Decode a repository archive from disk.
    ///
    /// Entries that fail to decode are skipped with a warning; one bad
    /// block does not poison the rest of the archive.
    pub fn load(path: &Path) -> Result<Repository> {
        let file = File::open(path)
            .with_context(|| format!("failed to open repository archive: {}", path.display()))?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let mut archive = Archive::new(decoder);

        let mut repository = Repository::default();

        for entry in archive
            .entries()
            .with_context(|| format!("failed to read repository archive: {}", path.display()))?
        {
            let mut entry = entry.context("failed to read repository archive entry")?;
            if entry.size() == 0 {
                continue;
            }

            let member = entry
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| String::from("?"));

            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .with_context(|| format!("repository entry `{}` is not UTF-8", member))?;

            match decode_package(&text) {
                Ok(package) => {
                    repository.entries.insert(package.name.clone(), package);
                }
                Err(e) => {
                    tracing::warn!("skipping repository entry `{}`: {}", member, e);
                }
            }
        }

        Ok(repository)
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.entries.get(name)
    }

    /// All records, sorted by name for deterministic iteration.
    pub fn records(&self) -> Vec<&PackageRecord> {
        let mut records: Vec<&PackageRecord> = self.entries.values().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn entry_text(name: &str, version: &str) -> String {
        let mut raw = RawEntry::default();
        for (field, value) in [
            ("filename", format!("{name}-{version}-x86_64.pkg.tar.zst")),
            ("name", name.to_string()),
            ("base", name.to_string()),
            ("version", version.to_string()),
            ("desc", format!("{name} description")),
            ("csize", "10".to_string()),
            ("isize", "20".to_string()),
            ("url", "https://example.com".to_string()),
            ("arch", "x86_64".to_string()),
            ("builddate", "1700000000".to_string()),
            ("packager", "Tester".to_string()),
        ] {
            raw.push_value(field, &value);
        }
        raw.encode()
    }

    fn write_archive(path: &Path, members: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (member_path, contents) in members {
            let mut header = tar::Header::new_gnu();
            header.set_path(member_path).unwrap();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append(&header, std::io::Cursor::new(contents.as_bytes()))
                .unwrap();
        }

        builder.finish().unwrap();
    }

    #[test]
    fn test_load_archive() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.db");
        let zlib = entry_text("zlib", "1.3-1");
        let attr = entry_text("attr", "2.5-2");
        write_archive(
            &path,
            &[("zlib-1.3-1/desc", &zlib), ("attr-2.5-2/desc", &attr)],
        );

        let repo = Repository::load(&path).unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get("zlib").unwrap().version, "1.3-1");
        assert_eq!(repo.get("attr").unwrap().version, "2.5-2");
        assert!(repo.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.db");
        let old = entry_text("zlib", "1.2-1");
        let new = entry_text("zlib", "1.3-1");
        write_archive(&path, &[("zlib-1.2-1/desc", &old), ("zlib-1.3-1/desc", &new)]);

        let repo = Repository::load(&path).unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get("zlib").unwrap().version, "1.3-1");
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.db");
        let good = entry_text("zlib", "1.3-1");
        write_archive(
            &path,
            &[("broken/desc", "%NAME%\nbroken\n"), ("zlib-1.3-1/desc", &good)],
        );

        let repo = Repository::load(&path).unwrap();
        assert_eq!(repo.len(), 1);
        assert!(repo.get("zlib").is_some());
        assert!(repo.get("broken").is_none());
    }

    #[test]
    fn test_empty_members_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.db");
        let good = entry_text("zlib", "1.3-1");
        write_archive(&path, &[("zlib-1.3-1/", ""), ("zlib-1.3-1/desc", &good)]);

        let repo = Repository::load(&path).unwrap();
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_records_sorted_by_name() {
        let repo = Repository::from_records(vec![
            PackageRecord::new("b", "b", "1-1"),
            PackageRecord::new("a", "a", "1-1"),
        ]);
        let names: Vec<&str> = repo.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
