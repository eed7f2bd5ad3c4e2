//! Recipe checkout via git.

use std::path::Path;

use anyhow::{Context, Result};
use url::Url;

use crate::builder::RecipeSource;
use crate::core::{recipe, PackageRecord};

/// Clones build recipes from a git hosting base URL, one repository per
/// package base (`<clone_base>/<base>.git`).
pub struct GitRecipeSource {
    clone_base: Url,
}

impl GitRecipeSource {
    pub fn new(clone_base: Url) -> Self {
        GitRecipeSource { clone_base }
    }

    fn recipe_url(&self, base: &str) -> String {
        format!(
            "{}/{}.git",
            self.clone_base.as_str().trim_end_matches('/'),
            base
        )
    }
}

impl RecipeSource for GitRecipeSource {
    fn clone_recipe(&self, base: &str, dest: &Path) -> Result<()> {
        let url = self.recipe_url(base);
        tracing::info!("cloning {}", url);

        git2::Repository::clone(&url, dest)
            .with_context(|| format!("failed to clone recipe from {}", url))?;

        Ok(())
    }

    fn load_recipe(&self, dir: &Path) -> Result<Vec<PackageRecord>> {
        recipe::load(dir)
    }
}
