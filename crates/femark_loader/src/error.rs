//! Loader error types.

use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::platform::{Arch, Os};

/// Terminal errors raised while resolving the native binding.
///
/// Every variant is fatal: without a loaded module there is nothing to
/// render markdown with.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The host has no entry in the artifact table. No load was attempted.
    #[error("{}", unsupported_message(.os, .arch))]
    UnsupportedPlatform { os: Os, arch: Arch },

    /// Neither the local file nor the package could be loaded.
    ///
    /// Holds the last load error, if any load was attempted at all.
    #[error("{}", load_failure_message(.0))]
    LoadFailure(Option<LoadError>),

    /// Loader configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ResolveError {
    /// Creates an unsupported platform error.
    pub fn unsupported(os: Os, arch: Arch) -> Self {
        Self::UnsupportedPlatform { os, arch }
    }

    /// Returns the captured load error of a [`ResolveError::LoadFailure`].
    pub fn load_error(&self) -> Option<&LoadError> {
        match self {
            Self::LoadFailure(error) => error.as_ref(),
            _ => None,
        }
    }
}

fn unsupported_message(os: &Os, arch: &Arch) -> String {
    match os.display_name() {
        Some(name) => format!("Unsupported architecture on {}: {}", name, arch),
        None => format!("Unsupported OS: {}, architecture: {}", os, arch),
    }
}

fn load_failure_message(error: &Option<LoadError>) -> String {
    match error {
        Some(error) => format!("Failed to load native binding: {}", error),
        None => "Failed to load native binding".to_string(),
    }
}

/// Errors from a single load attempt.
///
/// These are recoverable while another strategy remains.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The shared library could not be opened.
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The library does not export a required symbol.
    #[error("Symbol `{symbol}` not found in {}: {source}", .path.display())]
    MissingSymbol {
        symbol: &'static str,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// No package root contains the package.
    #[error("Cannot find package '{name}' (searched {} package roots)", .searched.len())]
    PackageNotFound { name: String, searched: Vec<PathBuf> },

    /// The package exists but cannot be used.
    #[error("Invalid package '{name}': {reason}")]
    InvalidPackage { name: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Creates an invalid package error.
    pub fn invalid_package(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPackage {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from calling into a loaded module.
#[derive(Debug, Error)]
pub enum CallError {
    /// The native function reported failure by returning no buffer.
    #[error("Native renderer returned no output")]
    NullOutput,

    /// The native function returned bytes that are not UTF-8.
    #[error("Native renderer returned invalid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Errors from the process-wide [`render_markdown`](crate::render_markdown).
#[derive(Debug, Error)]
pub enum RenderError {
    /// The binding failed to resolve at initialization.
    #[error("Native binding unavailable: {0}")]
    Unavailable(&'static ResolveError),

    /// The native call failed.
    #[error(transparent)]
    Call(#[from] CallError),
}

/// Errors reading loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or has unknown fields.
    #[error("Invalid config: {0}")]
    Invalid(#[from] serde_json::Error),
}
