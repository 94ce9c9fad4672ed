//! Native loader abstraction.
//!
//! The resolver decides *what* to load; a [`NativeLoader`] decides *how*.
//! [`DylibLoader`](crate::DylibLoader) opens real shared libraries, tests
//! substitute their own implementations.

use std::fmt;
use std::path::PathBuf;

use crate::error::LoadError;
use crate::module::ModuleHandle;

/// Target of a single load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleIdentifier {
    /// A bundled artifact next to the loader.
    File(PathBuf),
    /// An installed distributable package.
    Package {
        /// Package name, `<namespace>/<package>-<key>`.
        name: String,
        /// Library file used when the package does not name one.
        entry: String,
    },
}

impl fmt::Display for ModuleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Package { name, .. } => f.write_str(name),
        }
    }
}

/// Capability to turn an identifier into a loaded module.
pub trait NativeLoader {
    /// Loads the module named by `identifier`.
    fn load(&self, identifier: &ModuleIdentifier) -> Result<ModuleHandle, LoadError>;
}

impl<L: NativeLoader + ?Sized> NativeLoader for &L {
    fn load(&self, identifier: &ModuleIdentifier) -> Result<ModuleHandle, LoadError> {
        (**self).load(identifier)
    }
}
