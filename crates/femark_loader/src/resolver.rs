//! Binding resolution.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::binding::Binding;
use crate::config::LoaderConfig;
use crate::dylib::DylibLoader;
use crate::error::{LoadError, ResolveError};
use crate::loader::{ModuleIdentifier, NativeLoader};
use crate::package::PackageLocator;
use crate::platform::{ArtifactKey, HostFacts};

/// Where the binding for one artifact key may come from, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub key: ArtifactKey,
    /// Bundled artifact, tried only if the path exists.
    pub local: PathBuf,
    /// Distributable package, `None` when the fallback is disabled.
    pub package: Option<ModuleIdentifier>,
}

/// Resolves the native binding for a host.
///
/// Search order:
/// 1. `<binding_dir>/<package>.<key>.<ext>`
/// 2. The package `<namespace>/<package>-<key>`
pub struct BindingResolver<L = DylibLoader> {
    config: LoaderConfig,
    loader: L,
}

impl BindingResolver<DylibLoader> {
    /// Creates a resolver that opens shared libraries from disk.
    pub fn new(config: LoaderConfig) -> Self {
        let loader = DylibLoader::new(PackageLocator::from_config(&config));
        Self { config, loader }
    }
}

impl<L: NativeLoader> BindingResolver<L> {
    /// Creates a resolver with a custom loader.
    pub fn with_loader(config: LoaderConfig, loader: L) -> Self {
        Self { config, loader }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Computes what would be loaded for `host`, without touching the
    /// filesystem.
    pub fn plan(&self, host: &HostFacts) -> Result<LoadPlan, ResolveError> {
        let key = host.artifact_key()?;

        let local = self
            .config
            .binding_dir()
            .join(self.config.artifact_file_name(key));

        let package = self
            .config
            .package_fallback
            .then(|| ModuleIdentifier::Package {
                name: self.config.package_name_for(key),
                entry: self.config.artifact_file_name(key),
            });

        Ok(LoadPlan {
            key,
            local,
            package,
        })
    }

    /// Loads the binding for `host`.
    ///
    /// Unsupported hosts fail before anything is loaded. A bundled file that
    /// fails to load falls through to the package; when both fail, the
    /// package's error is reported.
    pub fn resolve(&self, host: &HostFacts) -> Result<Binding, ResolveError> {
        let plan = self.plan(host)?;
        debug!("Resolving native binding {} for {}", plan.key, host);

        let mut load_error: Option<LoadError> = None;

        if plan.local.exists() {
            let identifier = ModuleIdentifier::File(plan.local);
            match self.loader.load(&identifier) {
                Ok(handle) => return Ok(Binding::new(plan.key, identifier, handle)),
                Err(e) => {
                    warn!("Failed to load bundled binding '{}': {}", identifier, e);
                    load_error = Some(e);
                }
            }
        } else {
            debug!("No bundled binding at {}", plan.local.display());
        }

        if let Some(identifier) = plan.package {
            match self.loader.load(&identifier) {
                Ok(handle) => return Ok(Binding::new(plan.key, identifier, handle)),
                Err(e) => {
                    debug!("Failed to load package '{}': {}", identifier, e);
                    load_error = Some(e);
                }
            }
        }

        Err(ResolveError::LoadFailure(load_error))
    }
}
