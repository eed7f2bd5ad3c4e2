//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Slipway - an automated build bot and repository manager
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build recipes whose content hash changed since the last run
    Build(BuildArgs),

    /// Add built artifacts to the repository and upload it
    Publish(PublishArgs),

    /// Render and upload the JSON index for the repository
    Render(RenderArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Root of the recipes checkout (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Stop after this many successful builds (overrides the config)
    #[arg(long)]
    pub max_builds: Option<usize>,

    /// Configuration file (defaults to <root>/slipway.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PublishArgs {
    /// Directory backing the object store
    #[arg(long)]
    pub store: PathBuf,

    /// Root of the recipes checkout (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/slipway.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Directory backing the object store
    #[arg(long)]
    pub store: PathBuf,

    /// Root of the recipes checkout (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/slipway.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
