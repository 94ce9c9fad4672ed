//! Loaded native modules.

use std::fmt;
use std::sync::Arc;

use crate::error::CallError;

/// The one operation a native renderer module exposes.
pub trait MarkdownModule: Send + Sync {
    /// Renders markdown to HTML.
    fn process_markdown_to_html(&self, markdown: &str) -> Result<String, CallError>;
}

/// Shared handle to a loaded module.
///
/// Cloning is cheap; every clone refers to the same module, which stays
/// loaded until the last handle is dropped.
#[derive(Clone)]
pub struct ModuleHandle {
    module: Arc<dyn MarkdownModule>,
}

impl ModuleHandle {
    pub fn new(module: impl MarkdownModule + 'static) -> Self {
        Self {
            module: Arc::new(module),
        }
    }

    /// Calls the module's conversion function.
    pub fn process_markdown_to_html(&self, markdown: &str) -> Result<String, CallError> {
        self.module.process_markdown_to_html(markdown)
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle").finish_non_exhaustive()
    }
}
