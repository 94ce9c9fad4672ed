//! femark CLI
//!
//! Renders markdown to HTML through the platform's native femark binding.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

use femark_loader::LoaderConfig;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Render { file } => commands::render::run_render(config, file.as_deref()),
        Commands::Which => commands::which::run_which(config),
    }
}

fn load_config(cli: &Cli) -> Result<LoaderConfig> {
    match &cli.config {
        Some(path) => LoaderConfig::from_file(path)
            .map(LoaderConfig::with_env_overrides)
            .into_diagnostic(),
        None => LoaderConfig::from_env().into_diagnostic(),
    }
}
