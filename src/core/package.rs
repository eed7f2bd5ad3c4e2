//! Package record - the unified package shape across all sources.

use std::fmt;

use serde::Serialize;

use crate::core::depend::{parse_constraint, DependencyConstraint, OptionalDependency};

/// A package as reported by one source.
///
/// This is the minimum shape shared by sync databases, the remote index,
/// the custom repository, and build recipes. Fields a source does not
/// report stay `None` or empty. Records are built per resolution query and
/// discarded after use.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageRecord {
    /// Package name, unique within its source
    pub name: String,

    /// Base name of the recipe the package was built from
    pub base: String,

    /// Full version string (including the release suffix when known)
    pub version: String,

    /// Human description
    pub desc: String,

    /// Upstream URL
    pub url: Option<String>,

    /// Target architecture
    pub arch: Option<String>,

    /// Declared licenses
    pub licenses: Vec<String>,

    /// Artifact filename, when a prebuilt binary exists
    pub filename: Option<String>,

    /// Compressed artifact size in bytes
    pub csize: Option<u64>,

    /// Installed size in bytes
    pub isize: Option<u64>,

    pub md5sum: Option<String>,
    pub sha256sum: Option<String>,
    pub pgpsig: Option<String>,

    /// Build timestamp, seconds since the epoch
    pub builddate: Option<i64>,

    /// Packager name
    pub packager: Option<String>,

    /// Runtime dependencies
    pub depends: Vec<DependencyConstraint>,

    /// Build-time dependencies
    pub makedepends: Vec<DependencyConstraint>,

    /// Optional dependencies
    pub optdepends: Vec<OptionalDependency>,

    /// Names this package satisfies besides its own
    pub provides: Vec<String>,

    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
}

impl PackageRecord {
    /// Create a record with only the identity fields set.
    pub fn new(
        name: impl Into<String>,
        base: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        PackageRecord {
            name: name.into(),
            base: base.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Check whether this package satisfies `name`, either directly or via
    /// a `provides` declaration. Provides entries may carry a version
    /// suffix, which is ignored.
    pub fn satisfies(&self, name: &str) -> bool {
        self.name == name
            || self
                .provides
                .iter()
                .any(|p| parse_constraint(p).name == name)
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
