//! # femark_loader
//!
//! Loads the precompiled femark native renderer that matches the host
//! platform and exposes its single markdown-to-HTML operation.
//!
//! This crate provides:
//! - Host detection (OS, CPU architecture, libc flavor on Linux)
//! - The fixed artifact table mapping hosts to artifact keys
//! - Ordered load strategies: bundled local file, then installed package
//! - A process-wide binding resolved once and shared by every caller
//!
//! ## Example
//!
//! ```rust,ignore
//! // Resolve eagerly at startup so a missing binding fails fast.
//! femark_loader::init()?;
//!
//! let html = femark_loader::render_markdown("# Hello, World!")?;
//! assert_eq!(html, "<h1>Hello, World!</h1>\n");
//! ```

mod binding;
mod config;
mod dylib;
mod error;
mod libc;
mod loader;
mod module;
mod package;
mod platform;
mod resolver;

#[cfg(test)]
pub mod test_utils;

pub use binding::{Binding, binding, init, init_with, render_markdown};
pub use config::{BINDING_DIR_ENV, CONFIG_ENV, LoaderConfig, PACKAGE_PATH_ENV};
pub use dylib::{DylibLoader, DylibModule, FREE_SYMBOL, FemarkBuffer, PROCESS_SYMBOL};
pub use error::{CallError, ConfigError, LoadError, RenderError, ResolveError};
pub use libc::{GlibcReport, LDD_PATH, LibcProbe, RuntimeProbe, detect_libc_flavor};
pub use loader::{ModuleIdentifier, NativeLoader};
pub use module::{MarkdownModule, ModuleHandle};
pub use package::PackageLocator;
pub use platform::{Arch, ArtifactKey, HostFacts, LibcFlavor, Os};
pub use resolver::{BindingResolver, LoadPlan};
