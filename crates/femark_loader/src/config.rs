//! Loader configuration.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::platform::ArtifactKey;

/// Path of a JSON configuration file to load.
pub const CONFIG_ENV: &str = "FEMARK_CONFIG";
/// Overrides [`LoaderConfig::binding_dir`].
pub const BINDING_DIR_ENV: &str = "FEMARK_BINDING_DIR";
/// Extra package roots, in the platform's `PATH` list syntax.
pub const PACKAGE_PATH_ENV: &str = "FEMARK_PACKAGE_PATH";

/// Configuration for locating and loading the native binding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Base name of the native artifacts.
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Namespace of the distributable packages. Empty for none.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Directory searched for bundled artifacts.
    /// Defaults to the directory of the running executable.
    #[serde(default)]
    pub binding_dir: Option<PathBuf>,

    /// Native library extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Package roots searched before the default one.
    #[serde(default)]
    pub package_paths: Vec<PathBuf>,

    /// Whether to fall back to an installed package.
    #[serde(default = "default_package_fallback")]
    pub package_fallback: bool,

    /// Base directory for resolving relative paths.
    /// This is the directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_package_name() -> String {
    "femark".to_string()
}

fn default_namespace() -> String {
    "@benwis".to_string()
}

fn default_extension() -> String {
    std::env::consts::DLL_EXTENSION.to_string()
}

fn default_package_fallback() -> bool {
    true
}

impl LoaderConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            package_name: default_package_name(),
            namespace: default_namespace(),
            binding_dir: None,
            extension: default_extension(),
            package_paths: Vec::new(),
            package_fallback: default_package_fallback(),
            base_dir: None,
        }
    }

    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Builds configuration from variables supplied by `lookup`.
    ///
    /// [`CONFIG_ENV`] names a file to start from; [`BINDING_DIR_ENV`] and
    /// [`PACKAGE_PATH_ENV`] then override it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let config = match lookup(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(PathBuf::from(path))?,
            _ => Self::new(),
        };

        Ok(config.with_overrides(lookup))
    }

    /// Applies [`BINDING_DIR_ENV`] and [`PACKAGE_PATH_ENV`] from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var_os(name))
    }

    /// Applies the binding directory and package path overrides supplied by
    /// `lookup`. Override package roots are searched before configured ones.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(dir) = lookup(BINDING_DIR_ENV).filter(|v| !v.is_empty()) {
            self.binding_dir = Some(PathBuf::from(dir));
        }

        if let Some(paths) = lookup(PACKAGE_PATH_ENV) {
            let mut roots: Vec<PathBuf> = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            roots.append(&mut self.package_paths);
            self.package_paths = roots;
        }

        self
    }

    /// Directory holding bundled artifacts.
    pub fn binding_dir(&self) -> PathBuf {
        match &self.binding_dir {
            Some(dir) => self.resolve_path(dir),
            None => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Package roots in search order: configured roots, then the user data
    /// directory.
    pub fn package_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .package_paths
            .iter()
            .map(|p| self.resolve_path(p))
            .collect();

        if let Some(data) = dirs::data_dir() {
            roots.push(data.join("femark").join("packages"));
        }

        roots
    }

    /// File name of the bundled artifact, `<package>.<key>.<ext>`.
    pub fn artifact_file_name(&self, key: ArtifactKey) -> String {
        format!("{}.{}.{}", self.package_name, key, self.extension)
    }

    /// Name of the distributable package, `<namespace>/<package>-<key>`.
    pub fn package_name_for(&self, key: ArtifactKey) -> String {
        if self.namespace.is_empty() {
            format!("{}-{}", self.package_name, key)
        } else {
            format!("{}/{}-{}", self.namespace, self.package_name, key)
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}
