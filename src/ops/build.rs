//! Top-level build driver.
//!
//! The recipes checkout is a git repository whose submodules are the
//! tracked build recipes; a submodule's recorded commit id is the content
//! hash of its build inputs. The driver rebuilds a recipe exactly when
//! that hash differs from the one in the manifest, and stops early after a
//! configured number of successful builds, leaving the remainder for the
//! next invocation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::Repository as GitRepository;

use crate::builder::{BuildRunner, RecipeSource};
use crate::core::Workspace;
use crate::ops::manifest::BuildManifest;
use crate::resolver::Resolver;
use crate::sources::SourceRegistry;

/// Options for one driver invocation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Root of the recipes checkout.
    pub recipes_root: PathBuf,

    /// Stop after this many successful builds.
    pub max_builds: usize,
}

/// Outcome of one driver invocation.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Packages rebuilt this run, in order.
    pub built: Vec<String>,

    /// Packages skipped because their hash was unchanged.
    pub skipped: usize,

    /// Whether the run stopped early at the build limit.
    pub truncated: bool,
}

/// Process every tracked recipe once, strictly sequentially.
pub fn run(
    options: &BuildOptions,
    registry: &mut SourceRegistry,
    recipes: &dyn RecipeSource,
    runner: &dyn BuildRunner,
    manifest: &mut BuildManifest,
) -> Result<BuildSummary> {
    let repo = GitRepository::open(&options.recipes_root).with_context(|| {
        format!(
            "failed to open recipes checkout at {}",
            options.recipes_root.display()
        )
    })?;

    let workspace = Workspace::new(&options.recipes_root);
    let mut summary = BuildSummary::default();

    for submodule in repo
        .submodules()
        .context("failed to list recipe submodules")?
    {
        let key = submodule.path().to_string_lossy().to_string();
        let recipe_dir = options.recipes_root.join(submodule.path());

        let sha = match submodule.head_id() {
            Some(oid) => oid.to_string(),
            // Not recorded in HEAD yet; fall back to hashing the checkout
            None => crate::util::hash::sha256_dir(&recipe_dir)
                .with_context(|| format!("failed to hash recipe {}", key))?,
        };

        if process(
            &key, &recipe_dir, &sha, registry, recipes, runner, &workspace, manifest,
        )? {
            summary.built.push(key);
        } else {
            summary.skipped += 1;
        }

        if summary.built.len() >= options.max_builds {
            tracing::info!("hit max builds per single run, please run again");
            summary.truncated = true;
            break;
        }
    }

    Ok(summary)
}

/// Build one recipe if its content hash changed. Returns whether a build
/// ran.
#[allow(clippy::too_many_arguments)]
fn process(
    key: &str,
    recipe_dir: &Path,
    sha: &str,
    registry: &mut SourceRegistry,
    recipes: &dyn RecipeSource,
    runner: &dyn BuildRunner,
    workspace: &Workspace,
    manifest: &mut BuildManifest,
) -> Result<bool> {
    tracing::info!("processing package: {}", key);

    if !manifest.is_stale(key, sha) {
        tracing::info!("package {} up to date, not rebuilding", key);
        return Ok(false);
    }

    tracing::info!("building package {}", key);
    let members = recipes.load_recipe(recipe_dir)?;

    for member in &members {
        let mut resolver = Resolver::new(registry, recipes, runner, workspace);
        resolver.resolve(member, &members)?;
    }

    runner.build(recipe_dir, false)?;
    manifest.update(key, sha)?;
    tracing::info!("package {} updated", key);

    Ok(true)
}
