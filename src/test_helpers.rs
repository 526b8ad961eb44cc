//! Common test helper functions shared across test modules.
//!
//! [`TestRepo`] lays out a throwaway monorepo in a temporary directory so
//! tests run against real files.
use serde_json::{Map, Value, json};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

use crate::{
    config::Config,
    workspace::{PackageManifest, Workspace, unscoped},
};

/// Changelog header row used by fixtures.
pub const CHANGELOG_HEADER: &str = "| Version | Description |";

/// Serialized manifest in the exact format the workspace writes.
pub fn manifest_json(name: &str, version: &str, deps: &[(&str, &str)]) -> String {
    manifest_json_with(name, version, &[("dependencies", deps)])
}

/// Serialized manifest with several dependency sections.
pub fn manifest_json_with(
    name: &str,
    version: &str,
    sections: &[(&str, &[(&str, &str)])],
) -> String {
    let mut doc = Map::new();
    doc.insert("name".into(), json!(name));
    doc.insert("version".into(), json!(version));
    doc.insert("description".into(), json!(format!("{name} fixture")));
    doc.insert("main".into(), json!("dist/index.js"));

    for (section, deps) in sections.iter() {
        let mut entries = Map::new();
        for (dep, range) in deps.iter() {
            entries.insert(dep.to_string(), json!(range));
        }
        doc.insert(section.to_string(), Value::Object(entries));
    }

    let formatted = serde_json::to_string_pretty(&Value::Object(doc)).unwrap();
    format!("{formatted}\n")
}

/// Changelog with a version table. Rows are (version, description), newest
/// first.
pub fn changelog(title: &str, rows: &[(&str, &str)]) -> String {
    let mut lines = vec![
        format!("# {title} Changelog"),
        "".to_string(),
        CHANGELOG_HEADER.to_string(),
        "| ------- | ----------- |".to_string(),
    ];
    for (version, description) in rows.iter() {
        lines.push(format!("| {version} | {description} |"));
    }
    lines.push("".to_string());
    lines.join("\n")
}

/// A monorepo on disk.
pub struct TestRepo {
    tmp: TempDir,
    config: Config,
}

impl TestRepo {
    pub fn new() -> Self {
        Self::with_roots(&["packages"])
    }

    pub fn with_roots(roots: &[&str]) -> Self {
        Self::with_config(Config {
            package_roots: roots.iter().map(|r| r.to_string()).collect(),
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let tmp = TempDir::new().unwrap();
        Self { tmp, config }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.tmp.path(), &self.config)
    }

    /// Add a package under the first package root.
    pub fn add_package(
        &self,
        name: &str,
        version: &str,
        deps: &[(&str, &str)],
    ) -> PathBuf {
        let root = self.config.package_roots[0].clone();
        self.add_package_in(&root, name, version, deps)
    }

    pub fn add_package_in(
        &self,
        root: &str,
        name: &str,
        version: &str,
        deps: &[(&str, &str)],
    ) -> PathBuf {
        let dir = self.tmp.path().join(root).join(unscoped(name));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), manifest_json(name, version, deps))
            .unwrap();
        dir
    }

    pub fn add_changelog(&self, name: &str, content: &str) {
        let dir = self.workspace().package_dir(name).unwrap();
        fs::write(dir.join("CHANGELOG.md"), content).unwrap();
    }

    pub fn manifest(&self, name: &str) -> PackageManifest {
        self.workspace().load_manifest(name).unwrap()
    }

    pub fn raw_manifest(&self, name: &str) -> String {
        let dir = self.workspace().package_dir(name).unwrap();
        fs::read_to_string(dir.join("package.json")).unwrap()
    }

    pub fn changelog(&self, name: &str) -> String {
        let dir = self.workspace().package_dir(name).unwrap();
        fs::read_to_string(dir.join("CHANGELOG.md")).unwrap()
    }
}
