//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// femark - Render markdown to HTML with the native femark renderer
#[derive(Parser)]
#[command(name = "femark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Loader configuration file path, used instead of FEMARK_CONFIG.
    /// FEMARK_BINDING_DIR and FEMARK_PACKAGE_PATH still override it.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render markdown to HTML
    Render {
        /// Markdown file to render (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Show which native artifact this host resolves to
    Which,
}
