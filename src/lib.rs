//! Slipway - an automated build bot for user package repositories.
//!
//! This crate provides the core library functionality for Slipway:
//! decoding repository metadata, resolving dependencies across the four
//! package sources, materializing remote build recipes, and tracking
//! build inputs through a durable manifest.

pub mod builder;
pub mod core;
pub mod ops;
pub mod repo;
pub mod resolver;
pub mod sources;
pub mod util;

pub use crate::core::{
    depend::DependencyConstraint, depend::OptionalDependency, package::PackageRecord,
    workspace::Workspace,
};
pub use crate::ops::BuildManifest;
pub use crate::repo::Repository;
pub use crate::resolver::{ResolveError, Resolver};
pub use crate::sources::{Resolution, SourceRegistry};
pub use crate::util::config::Config;
