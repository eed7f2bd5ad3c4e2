//! High-level operations.
//!
//! This module contains the implementation of Slipway commands.

pub mod build;
pub mod manifest;
pub mod publish;
pub mod render;

pub use build::{run, BuildOptions, BuildSummary};
pub use manifest::{BuildManifest, ManifestEntry};
pub use publish::{DirStore, ObjectStore, Publisher};
pub use render::{upload_index, write_index, INDEX_NAME};
