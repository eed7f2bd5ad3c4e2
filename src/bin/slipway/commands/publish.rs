//! `slipway publish` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::PublishArgs;
use slipway::ops::{DirStore, Publisher};
use slipway::util::config::Config;

pub fn execute(args: PublishArgs) -> Result<()> {
    let root = args.root.unwrap_or_else(|| PathBuf::from("."));
    let config_path = args.config.unwrap_or_else(|| root.join("slipway.toml"));
    let config = Config::load_or_default(&config_path);

    let artifacts_dir = root.join(&config.build.artifacts_dir);
    slipway::util::fs::ensure_dir(&artifacts_dir)?;

    let store = DirStore::new(&args.store);
    let publisher = Publisher::new(&store, &config.repository.name, &artifacts_dir);

    let added = publisher.publish()?;
    tracing::info!("published {} package(s)", added);

    Ok(())
}
