//! Locating installed distributable packages.
//!
//! A package `<namespace>/<name>` is installed as the directory
//! `<root>/<namespace>/<name>/` under one of the package roots. Its
//! `package.json` may name the library in a `main` field; otherwise the
//! conventional artifact file name is used.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::error::LoadError;

const PACKAGE_MANIFEST: &str = "package.json";

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    main: Option<String>,
}

/// Finds package libraries under a list of package roots.
#[derive(Debug, Clone)]
pub struct PackageLocator {
    roots: Vec<PathBuf>,
}

impl PackageLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.package_roots())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Returns the library path of package `name`.
    ///
    /// Roots are searched in order; the first root containing the package
    /// directory wins, even when its library turns out to be unusable.
    pub fn locate(&self, name: &str, entry: &str) -> Result<PathBuf, LoadError> {
        let relative = package_dir(name)
            .ok_or_else(|| LoadError::invalid_package(name, "not a valid package name"))?;

        for root in &self.roots {
            let dir = root.join(&relative);
            if !dir.is_dir() {
                continue;
            }

            debug!("Found package '{}' in {}", name, root.display());
            let entry = read_main(&dir, name)?.unwrap_or_else(|| entry.to_string());
            return resolve_entry(&dir, name, &entry);
        }

        Err(LoadError::PackageNotFound {
            name: name.to_string(),
            searched: self.roots.clone(),
        })
    }
}

/// Relative directory of a package, `None` for names that are not exactly
/// `[@namespace/]name` made of normal path components.
fn package_dir(name: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = name.split('/').collect();
    match segments.as_slice() {
        [package] if is_single_component(package) => Some(PathBuf::from(*package)),
        [namespace, package] if is_single_component(namespace) && is_single_component(package) => {
            Some(Path::new(*namespace).join(*package))
        }
        _ => None,
    }
}

fn is_single_component(s: &str) -> bool {
    let mut components = Path::new(s).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) => c == s,
        _ => false,
    }
}

fn read_main(dir: &Path, name: &str) -> Result<Option<String>, LoadError> {
    let manifest_path = dir.join(PACKAGE_MANIFEST);
    if !manifest_path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&manifest_path)?;
    let manifest: PackageManifest = serde_json::from_str(&content).map_err(|e| {
        LoadError::invalid_package(name, format!("invalid {}: {}", PACKAGE_MANIFEST, e))
    })?;

    Ok(manifest.main)
}

/// Joins `entry` onto the package directory, refusing anything that would
/// leave it.
fn resolve_entry(dir: &Path, name: &str, entry: &str) -> Result<PathBuf, LoadError> {
    let p = Path::new(entry);

    if p.is_absolute() || p.has_root() {
        warn!("Ignoring absolute package entry: {}", entry);
        return Err(LoadError::invalid_package(name, "entry must be relative"));
    }

    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        warn!("Ignoring package entry containing '..': {}", entry);
        return Err(LoadError::invalid_package(name, "entry must not contain '..'"));
    }

    let joined = dir.join(p);
    if !joined.is_file() {
        return Err(LoadError::invalid_package(
            name,
            format!("entry {} does not exist", entry),
        ));
    }

    let (canon_path, canon_dir) = (joined.canonicalize()?, dir.canonicalize()?);
    if !canon_path.starts_with(&canon_dir) {
        warn!("Ignoring package entry that resolves outside the package: {}", entry);
        return Err(LoadError::invalid_package(
            name,
            "entry resolves outside the package",
        ));
    }

    Ok(canon_path)
}
