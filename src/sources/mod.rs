//! Package sources queried during dependency resolution.
//!
//! A dependency can be satisfied by four sources, tried in fixed order:
//! the sibling packages of the build unit being processed, the local sync
//! databases, the remote community index, and the custom repository this
//! bot maintains. The first source with a match wins.

pub mod custom;
pub mod local;
pub mod remote;

pub use custom::CustomRepository;
pub use local::{LocalDatabase, SyncDatabase};
pub use remote::{RemoteIndex, RpcClient};

use anyhow::Result;

use crate::core::PackageRecord;

/// A resolved dependency, tagged with the source that produced it.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Declared by the build unit currently being processed.
    Environment(PackageRecord),

    /// Installable from a local sync database.
    Local {
        database: String,
        package: PackageRecord,
    },

    /// Known only to the remote index; must be built from its recipe.
    Remote(PackageRecord),

    /// Already published in the custom repository.
    Repository(PackageRecord),
}

impl Resolution {
    pub fn package(&self) -> &PackageRecord {
        match self {
            Resolution::Environment(pkg) => pkg,
            Resolution::Local { package, .. } => package,
            Resolution::Remote(pkg) => pkg,
            Resolution::Repository(pkg) => pkg,
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            Resolution::Environment(_) => "environment",
            Resolution::Local { .. } => "local",
            Resolution::Remote(_) => "remote",
            Resolution::Repository(_) => "repository",
        }
    }
}

/// The configured sources, queried in precedence order.
///
/// The database list and endpoints come in through the constructor; the
/// registry's lifecycle is one resolution run.
pub struct SourceRegistry {
    databases: Vec<Box<dyn LocalDatabase>>,
    remote: Box<dyn RemoteIndex>,
    custom: CustomRepository,
}

impl SourceRegistry {
    pub fn new(
        databases: Vec<Box<dyn LocalDatabase>>,
        remote: Box<dyn RemoteIndex>,
        custom: CustomRepository,
    ) -> Self {
        SourceRegistry {
            databases,
            remote,
            custom,
        }
    }

    /// Look `name` up across all sources.
    ///
    /// `environment` is the sibling set of the build unit being processed;
    /// matches there are exact and case-sensitive. Within the database
    /// list, an exact-name hit is preferred over a provider, and the first
    /// database with either kind of hit wins. Returns `None` when no
    /// source knows the name; sources only error on input they cannot
    /// parse at all.
    pub fn lookup(
        &mut self,
        name: &str,
        environment: &[PackageRecord],
    ) -> Result<Option<Resolution>> {
        if let Some(pkg) = environment.iter().find(|p| p.name == name) {
            tracing::debug!("found {} in the current build unit", name);
            return Ok(Some(Resolution::Environment(pkg.clone())));
        }

        for database in &mut self.databases {
            let found = match database.get(name)? {
                Some(pkg) => Some(pkg),
                None => database.find_provider(name)?,
            };
            if let Some(package) = found {
                tracing::debug!("found {} in sync database {}", name, database.name());
                return Ok(Some(Resolution::Local {
                    database: database.name().to_string(),
                    package,
                }));
            }
        }

        if let Some(pkg) = self.remote.info(name)? {
            tracing::debug!("found {} on the remote index", name);
            return Ok(Some(Resolution::Remote(pkg)));
        }

        if let Some(pkg) = self.custom.get(name)? {
            tracing::debug!("found {} in the custom repository", name);
            return Ok(Some(Resolution::Repository(pkg)));
        }

        Ok(None)
    }
}
