//! The process-wide native binding.
//!
//! The binding is resolved at most once per process, either eagerly through
//! [`init`]/[`init_with`] or lazily on the first [`render_markdown`] call.
//! The outcome, success or error, is kept for the life of the process and is
//! never resolved again.

use std::sync::OnceLock;

use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::{CallError, RenderError, ResolveError};
use crate::loader::ModuleIdentifier;
use crate::module::ModuleHandle;
use crate::platform::{ArtifactKey, HostFacts};
use crate::resolver::BindingResolver;

static BINDING: OnceLock<Result<Binding, ResolveError>> = OnceLock::new();

/// A loaded native module together with where it came from.
#[derive(Debug, Clone)]
pub struct Binding {
    key: ArtifactKey,
    origin: ModuleIdentifier,
    handle: ModuleHandle,
}

impl Binding {
    pub fn new(key: ArtifactKey, origin: ModuleIdentifier, handle: ModuleHandle) -> Self {
        Self {
            key,
            origin,
            handle,
        }
    }

    /// The artifact this binding was resolved for.
    pub fn key(&self) -> ArtifactKey {
        self.key
    }

    /// The file or package the module was loaded from.
    pub fn origin(&self) -> &ModuleIdentifier {
        &self.origin
    }

    /// Renders markdown with the native module. The output is returned
    /// exactly as the module produced it.
    pub fn render_markdown(&self, markdown: &str) -> Result<String, CallError> {
        self.handle.process_markdown_to_html(markdown)
    }
}

/// Resolves the binding using configuration from the environment.
///
/// Returns the cached outcome if the binding was already resolved.
pub fn init() -> Result<&'static Binding, &'static ResolveError> {
    BINDING.get_or_init(resolve_from_env).as_ref()
}

/// Resolves the binding using `config`.
///
/// `config` is ignored if the binding was already resolved; the cached
/// outcome is returned instead.
pub fn init_with(config: LoaderConfig) -> Result<&'static Binding, &'static ResolveError> {
    BINDING
        .get_or_init(|| BindingResolver::new(config).resolve(&HostFacts::detect()))
        .as_ref()
}

/// The process-wide binding, resolved on first use.
pub fn binding() -> Result<&'static Binding, &'static ResolveError> {
    init()
}

/// Renders markdown to HTML with the process-wide binding.
pub fn render_markdown(markdown: &str) -> Result<String, RenderError> {
    let binding = binding().map_err(RenderError::Unavailable)?;
    Ok(binding.render_markdown(markdown)?)
}

fn resolve_from_env() -> Result<Binding, ResolveError> {
    let config = LoaderConfig::from_env()?;
    debug!("Loader configuration: {:?}", config);
    BindingResolver::new(config).resolve(&HostFacts::detect())
}
