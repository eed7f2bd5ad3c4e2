//! Slipway CLI - automated package building and repository publishing.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use slipway::builder::{BuildError, BUILD_FAILURE_EXIT};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// A failed external build gets its own exit status so CI wrappers can
/// tell it apart from configuration problems.
fn exit_code(err: &anyhow::Error) -> i32 {
    if err
        .chain()
        .any(|cause| cause.downcast_ref::<BuildError>().is_some())
    {
        BUILD_FAILURE_EXIT
    } else {
        1
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else {
        EnvFilter::new("slipway=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Publish(args) => commands::publish::execute(args),
        Commands::Render(args) => commands::render::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
