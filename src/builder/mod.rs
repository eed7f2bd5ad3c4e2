//! Build execution against checked-out recipes.
//!
//! The resolver and the driver only see the two traits here; the real
//! implementations shell out to `makepkg` and clone recipes over git.
//! Ambient credentials (signing keys, keyrings) are the concern of
//! whoever constructs the runner, not of these interfaces.

pub mod makepkg;
pub mod recipes;

pub use makepkg::MakepkgRunner;
pub use recipes::GitRecipeSource;

use std::path::Path;

use thiserror::Error;

use crate::core::PackageRecord;

/// Process exit status the CLI reports when the external build tool fails.
pub const BUILD_FAILURE_EXIT: i32 = 100;

/// Failure of one external build-tool invocation. Never retried.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with code {code}")]
    Failed { program: String, code: i32 },
}

/// Produces installable artifacts from a recipe checkout.
pub trait BuildRunner {
    /// Build the recipe at `recipe_dir`. When `install` is set the
    /// produced artifacts are also installed into the running system, so
    /// later builds can link against them.
    fn build(&self, recipe_dir: &Path, install: bool) -> Result<(), BuildError>;
}

/// Fetches and loads build recipes for materialized dependencies.
pub trait RecipeSource {
    /// Populate `dest` with a checkout of the recipe for `base`.
    fn clone_recipe(&self, base: &str, dest: &Path) -> anyhow::Result<()>;

    /// Load the package records a recipe checkout declares.
    fn load_recipe(&self, dir: &Path) -> anyhow::Result<Vec<PackageRecord>>;
}
