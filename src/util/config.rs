//! Configuration file support.
//!
//! Slipway reads `slipway.toml` from the root of the recipes checkout;
//! every setting has a built-in default, so the file is optional. The
//! source list and endpoints live here rather than in process globals, so
//! a registry's lifecycle is scoped to one run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Slipway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Custom repository settings
    pub repository: RepositoryConfig,

    /// Package source settings
    pub sources: SourcesConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// Settings for the custom repository this bot maintains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository name; also the base name of its archive files.
    pub name: String,

    /// Path of the repository database archive used for source lookups.
    /// Defaults to `<artifacts_dir>/<name>.db.tar.gz`.
    pub archive: Option<PathBuf>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            name: "slipway".to_string(),
            archive: None,
        }
    }
}

/// Settings for the sources queried during resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// AUR-compatible RPC endpoint for the remote index.
    pub index_url: String,

    /// Base URL recipes are cloned from (`<clone_url>/<base>.git`).
    pub clone_url: String,

    /// Directory containing the local sync databases.
    pub sync_dir: PathBuf,

    /// Sync database names, in lookup order.
    pub databases: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            index_url: "https://aur.archlinux.org".to_string(),
            clone_url: "https://aur.archlinux.org".to_string(),
            sync_dir: PathBuf::from("/var/lib/pacman/sync"),
            databases: vec![
                "core".to_string(),
                "extra".to_string(),
                "community".to_string(),
                "multilib".to_string(),
            ],
        }
    }
}

/// Build-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Where makepkg drops finished artifacts.
    pub artifacts_dir: PathBuf,

    /// Manifest of last-built content hashes.
    pub manifest: PathBuf,

    /// Successful builds allowed per invocation.
    pub max_builds: usize,

    /// makepkg program override.
    pub makepkg: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            artifacts_dir: PathBuf::from("artifacts"),
            manifest: PathBuf::from("manifest.csv"),
            max_builds: 5,
            makepkg: None,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = crate::util::fs::read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Path of the repository database archive, relative paths resolved
    /// against the artifacts directory default.
    pub fn archive_path(&self) -> PathBuf {
        match &self.repository.archive {
            Some(path) => path.clone(),
            None => self
                .build
                .artifacts_dir
                .join(format!("{}.db.tar.gz", self.repository.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.repository.name, "slipway");
        assert_eq!(config.sources.databases[0], "core");
        assert_eq!(config.build.max_builds, 5);
        assert_eq!(
            config.archive_path(),
            PathBuf::from("artifacts/slipway.db.tar.gz")
        );
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("slipway.toml");

        std::fs::write(
            &config_path,
            r#"
[repository]
name = "aurei"

[sources]
index_url = "https://aur.example.org"
databases = ["core", "extra"]

[build]
max_builds = 2
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.repository.name, "aurei");
        assert_eq!(config.sources.index_url, "https://aur.example.org");
        assert_eq!(config.sources.databases, vec!["core", "extra"]);
        assert_eq!(config.build.max_builds, 2);
        // Unset sections keep their defaults
        assert_eq!(config.build.manifest, PathBuf::from("manifest.csv"));
    }

    #[test]
    fn test_config_load_or_default_missing_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_or_default(&tmp.path().join("nonexistent.toml"));
        assert_eq!(config.repository.name, "slipway");
    }

    #[test]
    fn test_explicit_archive_path() {
        let mut config = Config::default();
        config.repository.archive = Some(PathBuf::from("/srv/repo/aurei.db.tar.gz"));
        assert_eq!(
            config.archive_path(),
            PathBuf::from("/srv/repo/aurei.db.tar.gz")
        );
    }
}
