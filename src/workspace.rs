//! Filesystem view of the monorepo.
//!
//! Every read and write of a manifest or changelog goes through
//! [`Workspace`], so the pipeline never touches ambient paths directly.
use log::*;
use serde_json::{Value, json};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Result, TalosError, config::Config};

/// Manifest sections holding dependency ranges.
pub const DEPENDENCY_SECTIONS: [&str; 3] =
    ["dependencies", "devDependencies", "peerDependencies"];

const RANGE_MODIFIERS: [char; 2] = ['^', '~'];

/// Package name without its `@scope/` prefix.
pub fn unscoped(name: &str) -> &str {
    match name.strip_prefix('@') {
        Some(rest) => rest.split_once('/').map(|(_, n)| n).unwrap_or(name),
        None => name,
    }
}

/// Strip leading range modifiers (`^`, `~`) from a version token.
pub fn strip_range_modifier(range: &str) -> &str {
    range.trim_start_matches(RANGE_MODIFIERS)
}

/// Split a dependency range into its modifier prefix and version part.
pub fn split_range(range: &str) -> (&str, &str) {
    let version = strip_range_modifier(range);
    let prefix = &range[..range.len() - version.len()];
    (prefix, version)
}

/// A package's manifest, kept as a JSON document so that unknown fields and
/// key order survive a rewrite.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    pub path: PathBuf,
    pub name: String,
    doc: Value,
}

impl PackageManifest {
    /// Build a manifest from raw file content.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(content).map_err(|e| {
            TalosError::ManifestReadFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let name = doc
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| TalosError::ManifestReadFailure {
                path: path.to_path_buf(),
                reason: "missing \"name\"".into(),
            })?
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            doc,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.doc.get("version").and_then(Value::as_str)
    }

    pub fn set_version(&mut self, version: &str) {
        self.doc["version"] = json!(version);
    }

    /// Dependency entries of one section, in manifest order.
    pub fn dependencies(&self, section: &str) -> Vec<(String, String)> {
        self.doc
            .get(section)
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, range)| {
                        range.as_str().map(|r| (name.clone(), r.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rewrite an existing dependency entry. Returns false when the entry is
    /// absent.
    pub fn set_dependency(
        &mut self,
        section: &str,
        name: &str,
        range: &str,
    ) -> bool {
        if let Some(deps) = self.doc.get_mut(section).and_then(Value::as_object_mut)
            && let Some(entry) = deps.get_mut(name)
        {
            *entry = json!(range);
            return true;
        }
        false
    }

    /// Serialized form, two-space indented with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let formatted = serde_json::to_string_pretty(&self.doc).map_err(|e| {
            TalosError::ManifestWriteFailure {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(format!("{formatted}\n"))
    }
}

/// The monorepo working tree.
#[derive(Debug, Clone)]
pub struct Workspace {
    package_roots: Vec<PathBuf>,
    manifest_file: String,
    changelog_file: String,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        let root = root.into();
        let package_roots =
            config.package_roots.iter().map(|r| root.join(r)).collect();
        Self {
            package_roots,
            manifest_file: config.manifest_file.clone(),
            changelog_file: config.changelog_file.clone(),
        }
    }

    /// Every package directory (one holding a manifest) under the package
    /// roots, sorted so scans are deterministic.
    pub fn package_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = vec![];

        for package_root in self.package_roots.iter() {
            if !package_root.is_dir() {
                warn!("package root does not exist: {}", package_root.display());
                continue;
            }

            for entry in fs::read_dir(package_root)? {
                let path = entry?.path();
                if path.is_dir() && path.join(&self.manifest_file).is_file() {
                    dirs.push(path);
                }
            }
        }

        dirs.sort();
        Ok(dirs)
    }

    /// Resolve a package directory from a (scoped or unscoped) package name.
    pub fn package_dir(&self, name: &str) -> Option<PathBuf> {
        let unscoped = unscoped(name);
        self.package_roots
            .iter()
            .map(|r| r.join(unscoped))
            .find(|dir| dir.join(&self.manifest_file).is_file())
    }

    pub fn manifest_path(&self, package_dir: &Path) -> PathBuf {
        package_dir.join(&self.manifest_file)
    }

    pub fn read_manifest(&self, path: &Path) -> Result<PackageManifest> {
        let content = fs::read_to_string(path).map_err(|e| {
            TalosError::ManifestReadFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        PackageManifest::parse(path, &content)
    }

    /// Load the manifest of a named package.
    pub fn load_manifest(&self, name: &str) -> Result<PackageManifest> {
        let dir = self
            .package_dir(name)
            .ok_or_else(|| TalosError::UnknownPackage(name.to_string()))?;
        self.read_manifest(&self.manifest_path(&dir))
    }

    pub fn write_manifest(&self, manifest: &PackageManifest) -> Result<()> {
        let content = manifest.to_json()?;
        debug!("writing manifest: {}", manifest.path.display());
        fs::write(&manifest.path, content).map_err(|e| {
            TalosError::ManifestWriteFailure {
                path: manifest.path.clone(),
                reason: e.to_string(),
            }
        })
    }

    /// Locate a package's changelog file by package name.
    pub fn changelog_path(&self, name: &str) -> Result<PathBuf> {
        let dir = self
            .package_dir(name)
            .ok_or_else(|| TalosError::ChangelogNotFound(name.to_string()))?;
        self.changelog_in(&dir)
    }

    /// Changelog file inside a known package directory.
    pub fn changelog_in(&self, package_dir: &Path) -> Result<PathBuf> {
        let path = package_dir.join(&self.changelog_file);
        if !path.is_file() {
            return Err(TalosError::ChangelogNotFound(
                path.display().to_string(),
            ));
        }
        Ok(path)
    }

    pub fn read_changelog(&self, name: &str) -> Result<(PathBuf, String)> {
        let path = self.changelog_path(name)?;
        let content = fs::read_to_string(&path)?;
        Ok((path, content))
    }

    pub fn read_changelog_in(
        &self,
        package_dir: &Path,
    ) -> Result<(PathBuf, String)> {
        let path = self.changelog_in(package_dir)?;
        let content = fs::read_to_string(&path)?;
        Ok((path, content))
    }

    pub fn write_changelog(&self, path: &Path, content: &str) -> Result<()> {
        debug!("writing changelog: {}", path.display());
        fs::write(path, content)?;
        Ok(())
    }
}
