//! Core data types shared across the crate.

pub mod depend;
pub mod package;
pub mod recipe;
pub mod workspace;

pub use depend::{
    parse_constraint, parse_optdep, Comparator, DependencyConstraint, OptionalDependency,
};
pub use package::PackageRecord;
pub use workspace::Workspace;
