//! Render command implementation

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use miette::{IntoDiagnostic, Result, WrapErr, miette};
use tracing::debug;

use femark_loader::LoaderConfig;

pub fn run_render(config: LoaderConfig, file: Option<&Path>) -> Result<()> {
    // Resolve before reading input so a missing binding is reported at once.
    let binding = femark_loader::init_with(config).map_err(|e| miette!("{}", e))?;
    debug!("Rendering with {} from {}", binding.key(), binding.origin());

    let markdown = match file {
        Some(path) => fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).into_diagnostic()?;
            buffer
        }
    };

    let html = binding.render_markdown(&markdown).into_diagnostic()?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(html.as_bytes()).into_diagnostic()?;
    stdout.flush().into_diagnostic()
}
