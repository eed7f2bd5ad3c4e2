//! Publishing built artifacts into the custom repository.
//!
//! Everything here is glue over external collaborators: the object store
//! holding the published files and the `repo-add` tool maintaining the
//! repository database. The store is an injected capability; cloud
//! backends live outside this crate, while the filesystem-backed
//! [`DirStore`] serves local mirrors and tests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

use crate::util::process::{find_executable, ProcessBuilder};

/// Storage backend for the published repository files.
pub trait ObjectStore {
    /// Fetch `key` into the local file `dest`.
    fn download(&self, key: &str, dest: &Path) -> Result<()>;

    /// Publish the local file `src` under `key`.
    fn upload(&self, src: &Path, key: &str) -> Result<()>;
}

/// Filesystem-backed object store.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStore { root: root.into() }
    }
}

impl ObjectStore for DirStore {
    fn download(&self, key: &str, dest: &Path) -> Result<()> {
        let src = self.root.join(key);
        if let Some(parent) = dest.parent() {
            crate::util::fs::ensure_dir(parent)?;
        }
        std::fs::copy(&src, dest)
            .with_context(|| format!("failed to download {}", src.display()))?;
        Ok(())
    }

    fn upload(&self, src: &Path, key: &str) -> Result<()> {
        let dest = self.root.join(key);
        if let Some(parent) = dest.parent() {
            crate::util::fs::ensure_dir(parent)?;
        }
        std::fs::copy(src, &dest)
            .with_context(|| format!("failed to upload {}", src.display()))?;
        Ok(())
    }
}

/// Maintains the repository archives in a store, adding built packages.
pub struct Publisher<'a> {
    store: &'a dyn ObjectStore,
    repo_name: String,
    artifacts_dir: PathBuf,
    repo_add: PathBuf,
}

impl<'a> Publisher<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        repo_name: impl Into<String>,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Self {
        let repo_add = find_executable("repo-add").unwrap_or_else(|| PathBuf::from("repo-add"));
        Publisher {
            store,
            repo_name: repo_name.into(),
            artifacts_dir: artifacts_dir.into(),
            repo_add,
        }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Path of the repository database archive inside the artifacts dir.
    pub fn database_path(&self) -> PathBuf {
        self.artifacts_dir
            .join(format!("{}.db.tar.gz", self.repo_name))
    }

    fn archive_names(&self) -> [String; 2] {
        [
            format!("{}.db.tar.gz", self.repo_name),
            format!("{}.files.tar.gz", self.repo_name),
        ]
    }

    /// Download the repository archives from the store.
    pub fn download(&self) -> Result<()> {
        tracing::info!("downloading repository files");
        for name in self.archive_names() {
            self.store.download(&name, &self.artifacts_dir.join(&name))?;
        }
        Ok(())
    }

    /// Upload the repository archives back to the store.
    ///
    /// Each archive also goes up under its extension-less name, which is
    /// the one package clients fetch.
    pub fn upload(&self) -> Result<()> {
        tracing::info!("uploading repository files");
        for name in self.archive_names() {
            let src = self.artifacts_dir.join(&name);
            if let Some(short) = name.strip_suffix(".tar.gz") {
                self.store.upload(&src, short)?;
            }
            self.store.upload(&src, &name)?;
        }
        Ok(())
    }

    /// List built package artifacts, signature files excluded.
    pub fn artifacts(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.artifacts_dir.join("*.pkg.tar*");
        let mut packages = Vec::new();

        for entry in
            glob(&pattern.to_string_lossy()).context("invalid artifact glob pattern")?
        {
            let path = entry.context("failed to read artifact directory entry")?;
            if path.extension().map_or(false, |ext| ext == "sig") {
                continue;
            }
            packages.push(path);
        }

        packages.sort();
        Ok(packages)
    }

    /// Upload one package (plus its signature when present) and register
    /// it in the repository database.
    pub fn add_package(&self, package: &Path) -> Result<()> {
        let name = package
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                anyhow::anyhow!("artifact has no printable name: {}", package.display())
            })?;
        tracing::info!("adding {} to repository", name);

        self.store.upload(package, name)?;

        let mut sig = package.as_os_str().to_owned();
        sig.push(".sig");
        let sig = PathBuf::from(sig);
        if sig.is_file() {
            tracing::debug!("uploading signature {}.sig", name);
            self.store.upload(&sig, &format!("{}.sig", name))?;
        }

        ProcessBuilder::new(&self.repo_add)
            .arg(format!("{}.db.tar.gz", self.repo_name))
            .arg(name)
            .cwd(&self.artifacts_dir)
            .exec_and_check()
            .with_context(|| format!("failed to add {} to the repository database", name))?;

        Ok(())
    }

    /// Publish every built artifact: download the archives, register each
    /// package, then upload the archives and the rendered index. Returns
    /// the number of packages added.
    pub fn publish(&self) -> Result<usize> {
        let packages = self.artifacts()?;
        tracing::info!("found {} packages to add to repo", packages.len());
        if packages.is_empty() {
            return Ok(0);
        }

        self.download()?;
        for package in &packages {
            self.add_package(package)?;
        }
        self.upload()?;
        crate::ops::render::upload_index(self)?;

        Ok(packages.len())
    }
}
