//! `slipway build` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::BuildArgs;
use slipway::builder::{GitRecipeSource, MakepkgRunner};
use slipway::ops::{run, BuildManifest, BuildOptions};
use slipway::sources::{CustomRepository, LocalDatabase, RpcClient, SourceRegistry, SyncDatabase};
use slipway::util::config::Config;

pub fn execute(args: BuildArgs) -> Result<()> {
    let root = args.root.unwrap_or_else(|| PathBuf::from("."));
    let config_path = args.config.unwrap_or_else(|| root.join("slipway.toml"));
    let config = Config::load_or_default(&config_path);

    // Sources, in lookup order: the sibling set is supplied per recipe by
    // the resolver, then sync databases, remote index, custom repository.
    let databases: Vec<Box<dyn LocalDatabase>> = config
        .sources
        .databases
        .iter()
        .map(|name| {
            Box::new(SyncDatabase::open_dir(&config.sources.sync_dir, name))
                as Box<dyn LocalDatabase>
        })
        .collect();

    let index_url = config
        .sources
        .index_url
        .parse()
        .with_context(|| format!("invalid index URL: {}", config.sources.index_url))?;
    let remote = RpcClient::new(index_url);

    let custom = CustomRepository::new(root.join(config.archive_path()));
    let mut registry = SourceRegistry::new(databases, Box::new(remote), custom);

    let clone_url = config
        .sources
        .clone_url
        .parse()
        .with_context(|| format!("invalid clone URL: {}", config.sources.clone_url))?;
    let recipes = GitRecipeSource::new(clone_url);

    // makepkg resolves PKGDEST relative to each recipe directory, so the
    // artifacts path has to be absolute.
    let artifacts_dir = root.join(&config.build.artifacts_dir);
    slipway::util::fs::ensure_dir(&artifacts_dir)?;
    let artifacts_dir = artifacts_dir
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", artifacts_dir.display()))?;

    let mut runner = MakepkgRunner::new(&artifacts_dir);
    if let Some(program) = &config.build.makepkg {
        runner = runner.with_program(program);
    }

    let mut manifest = BuildManifest::load(root.join(&config.build.manifest))?;

    let options = BuildOptions {
        recipes_root: root,
        max_builds: args.max_builds.unwrap_or(config.build.max_builds),
    };

    let summary = run(&options, &mut registry, &recipes, &runner, &mut manifest)?;

    tracing::info!(
        "built {} package(s), {} up to date",
        summary.built.len(),
        summary.skipped
    );
    if summary.truncated {
        tracing::info!("build limit reached; remaining packages are left for the next run");
    }

    Ok(())
}
