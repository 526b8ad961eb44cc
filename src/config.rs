//! Configuration loading and parsing for `talos.toml` files.
//!
//! Every field is optional: a repository without a `talos.toml` runs with the
//! defaults below.
use log::*;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::{Result, TalosError};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "talos.toml";

/// Default PR body template, rendered with Tera.
pub const DEFAULT_PR_BODY: &str = r#"Talos has bumped the dependents of freshly published packages.

## Published

{% for package in published -%}
- `{{ package.name }}` {{ package.from_version }} → {{ package.to_version }}
{% endfor %}
## Bumped

{% for bump in bumped -%}
- `{{ bump.name }}` → {{ bump.version }} (triggered by {{ bump.triggers | join(sep=", ") }})
{% endfor %}
{%- if changes %}
<details><summary>Dependency changes</summary>

{% for change in changes -%}
- {{ change }}
{% endfor %}
</details>
{% endif %}
{%- if skipped %}
## Skipped

{% for skip in skipped -%}
- `{{ skip.package }}`: {{ skip.reason }}
{% endfor %}
{%- endif %}
{% for package in published %}
<details><summary>{{ package.name }} changelog</summary>

{% if package.changelog_head -%}
{{ package.changelog_head }}
{%- else -%}
changelog unavailable
{%- endif %}

</details>
{% endfor %}"#;

/// Package manager invocation used to regenerate lockfiles.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstallConfig {
    /// Program to execute (e.g. "npm").
    pub program: String,
    /// Arguments passed to the program, run inside the package directory.
    pub args: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            program: "npm".into(),
            args: vec!["install".into()],
        }
    }
}

/// Root configuration structure for `talos.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories, relative to the repository root, whose immediate
    /// subdirectories are packages.
    pub package_roots: Vec<String>,
    /// Manifest filename inside each package directory.
    pub manifest_file: String,
    /// Changelog filename inside each package directory.
    pub changelog_file: String,
    /// Lockfile regeneration command.
    pub install: InstallConfig,
    /// Prefix of the per-run branch name.
    pub branch_prefix: String,
    /// Branch the pull request targets.
    pub base_branch: String,
    /// Remote the run branch is pushed to.
    pub remote: String,
    /// Message of the manifest + lockfile commit.
    pub bump_commit_message: String,
    /// Message of the changelog commit.
    pub changelog_commit_message: String,
    /// Pull request title.
    pub pr_title: String,
    /// Pull request body template.
    pub pr_body: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_roots: vec![
                "packages/components".into(),
                "packages/utilities".into(),
            ],
            manifest_file: "package.json".into(),
            changelog_file: "CHANGELOG.md".into(),
            install: InstallConfig::default(),
            branch_prefix: "talos-bump".into(),
            base_branch: "latest".into(),
            remote: "origin".into(),
            bump_commit_message: "Talos - Bump Dependencies".into(),
            changelog_commit_message: "Talos - Update changelogs".into(),
            pr_title: "Talos - Bump Dependencies".into(),
            pr_body: DEFAULT_PR_BODY.into(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `talos.toml` under
    /// `repo_root` when no path is given. A missing default file yields the
    /// default configuration; a missing explicit file is an error.
    pub fn load(repo_root: &Path, path: Option<&Path>) -> Result<Self> {
        let (file, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (repo_root.join(DEFAULT_CONFIG_FILE), false),
        };

        if !file.exists() {
            if explicit {
                return Err(TalosError::invalid_config(format!(
                    "config file does not exist: {}",
                    file.display()
                )));
            }
            info!("no configuration found: using default");
            return Ok(Config::default());
        }

        debug!("loading configuration from {}", file.display());
        let content = fs::read_to_string(&file)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.package_roots.is_empty() {
            return Err(TalosError::invalid_config(
                "package_roots must name at least one directory",
            ));
        }
        if self.install.program.trim().is_empty() {
            return Err(TalosError::invalid_config(
                "install.program must not be empty",
            ));
        }
        if self.branch_prefix.trim().is_empty() {
            return Err(TalosError::invalid_config(
                "branch_prefix must not be empty",
            ));
        }
        Ok(())
    }
}
