//! Rewrites dependents of freshly published packages.
//!
//! Every manifest in the workspace, except the published packages
//! themselves, is scanned for dependency entries naming a published package.
//! Entries that do not already point at the published version are rewritten,
//! keeping their `^`/`~` modifier. A package that cannot be read or written
//! is skipped and reported; the scan carries on with its siblings.
use indexmap::IndexMap;
use log::*;
use semver::Version;
use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    Result, TalosError,
    descriptor::{ARROW, PublishedPackage},
    workspace::{DEPENDENCY_SECTIONS, PackageManifest, Workspace, split_range},
};

/// A dependent whose manifest was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    /// Directory the manifest was found in. Later stages use it instead of
    /// resolving the package by name again.
    pub dir: PathBuf,
    /// Published packages that triggered the rewrite, in processing order.
    pub triggers: Vec<String>,
}

/// Packages whose manifests were mutated, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BumpRecord(IndexMap<String, Dependent>);

impl BumpRecord {
    /// Attribute a change of `package`, found in `dir`, to `trigger`.
    /// Repeated attributions of the same trigger are collapsed.
    pub fn attribute(&mut self, package: &str, dir: &Path, trigger: &str) {
        let dependent =
            self.0.entry(package.to_string()).or_insert_with(|| Dependent {
                dir: dir.to_path_buf(),
                triggers: vec![],
            });
        if !dependent.triggers.iter().any(|t| t == trigger) {
            dependent.triggers.push(trigger.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Dependent)> {
        self.0.iter()
    }
}

#[cfg(test)]
impl BumpRecord {
    pub fn packages(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn triggers(&self, package: &str) -> Option<&[String]> {
        self.0.get(package).map(|d| d.triggers.as_slice())
    }

    pub fn dir(&self, package: &str) -> Option<&Path> {
        self.0.get(package).map(|d| d.dir.as_path())
    }
}

/// One rewritten dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyChange {
    pub package: String,
    pub section: String,
    pub dependency: String,
    pub from_range: String,
    pub to_range: String,
}

impl fmt::Display for DependencyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {ARROW} {} ({})",
            self.package,
            self.dependency,
            self.from_range,
            self.to_range,
            self.section
        )
    }
}

/// A package left out of the scan.
#[derive(Debug)]
pub struct SkippedPackage {
    /// Package name, or manifest path when the name could not be read.
    pub package: String,
    pub error: TalosError,
}

/// Outcome of one upgrade scan.
#[derive(Debug, Default)]
pub struct UpgradeReport {
    pub bumps: BumpRecord,
    pub changes: Vec<DependencyChange>,
    pub skipped: Vec<SkippedPackage>,
}

impl UpgradeReport {
    /// Human readable diff of every rewritten entry.
    pub fn diff(&self) -> String {
        self.changes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scan the workspace and rewrite every dependent of `published`.
///
/// Only enumerating the package roots can fail the whole scan.
pub fn upgrade_dependencies(
    workspace: &Workspace,
    published: &[PublishedPackage],
) -> Result<UpgradeReport> {
    upgrade_with(workspace, published, |manifest| {
        workspace.write_manifest(manifest)
    })
}

fn upgrade_with<W>(
    workspace: &Workspace,
    published: &[PublishedPackage],
    mut write: W,
) -> Result<UpgradeReport>
where
    W: FnMut(&PackageManifest) -> Result<()>,
{
    let mut report = UpgradeReport::default();

    for dir in workspace.package_dirs()? {
        let path = workspace.manifest_path(&dir);

        let mut manifest = match workspace.read_manifest(&path) {
            Ok(manifest) => manifest,
            Err(error) => {
                warn!("skipping package: {error}");
                report.skipped.push(SkippedPackage {
                    package: path.display().to_string(),
                    error,
                });
                continue;
            }
        };

        if published.iter().any(|p| p.name == manifest.name) {
            debug!("skipping published package: {}", manifest.name);
            continue;
        }

        let (triggers, changes) = rewrite_dependencies(&mut manifest, published);

        if triggers.is_empty() {
            continue;
        }

        if let Err(error) = write(&manifest) {
            warn!("skipping package {}: {error}", manifest.name);
            report.skipped.push(SkippedPackage {
                package: manifest.name.clone(),
                error,
            });
            continue;
        }

        info!(
            "upgraded {} ({})",
            manifest.name,
            triggers.join(", ")
        );

        for trigger in triggers.iter() {
            report.bumps.attribute(&manifest.name, &dir, trigger);
        }
        report.changes.extend(changes);
    }

    Ok(report)
}

/// Rewrite entries in memory, returning the triggering package names in
/// `published` order along with the changes made.
fn rewrite_dependencies(
    manifest: &mut PackageManifest,
    published: &[PublishedPackage],
) -> (Vec<String>, Vec<DependencyChange>) {
    let mut triggers: Vec<String> = vec![];
    let mut changes = vec![];

    for package in published.iter() {
        for section in DEPENDENCY_SECTIONS {
            for (dep, range) in manifest.dependencies(section) {
                if dep != package.name {
                    continue;
                }

                let (prefix, version) = split_range(&range);

                match Version::parse(version) {
                    Ok(current) if current == package.to_version => {
                        debug!(
                            "{}: {dep} already at {range}",
                            manifest.name
                        );
                        continue;
                    }
                    Ok(_) => {}
                    Err(_) => {
                        debug!(
                            "{}: leaving non-version range {dep}@{range}",
                            manifest.name
                        );
                        continue;
                    }
                }

                let next = format!("{prefix}{}", package.to_version);
                manifest.set_dependency(section, &dep, &next);

                changes.push(DependencyChange {
                    package: manifest.name.clone(),
                    section: section.to_string(),
                    dependency: dep.clone(),
                    from_range: range.clone(),
                    to_range: next,
                });

                if !triggers.contains(&package.name) {
                    triggers.push(package.name.clone());
                }
            }
        }
    }

    (triggers, changes)
}
