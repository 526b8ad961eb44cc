//! Renders the pull request body describing a run.
use indexmap::IndexMap;
use semver::Version;
use serde::Serialize;

use crate::{
    Result,
    descriptor::PublishedPackage,
    upgrader::UpgradeReport,
};

#[derive(Debug, Clone, Serialize)]
pub struct PublishedSummary {
    pub name: String,
    pub from_version: String,
    pub to_version: String,
    /// Changelog rows added by this publish, when they could be extracted.
    pub changelog_head: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BumpedSummary {
    pub name: String,
    pub version: String,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSummary {
    pub package: String,
    pub reason: String,
}

/// Template context for the pull request body.
#[derive(Debug, Clone, Serialize)]
pub struct PrSummary {
    pub published: Vec<PublishedSummary>,
    pub bumped: Vec<BumpedSummary>,
    pub changes: Vec<String>,
    pub skipped: Vec<SkippedSummary>,
}

impl PrSummary {
    /// Build the summary. `heads` yields the changelog head for a published
    /// package, or `None` when unavailable.
    pub fn new(
        published: &[PublishedPackage],
        upgrade: &UpgradeReport,
        versions: &IndexMap<String, Version>,
        heads: impl Fn(&PublishedPackage) -> Option<String>,
    ) -> Self {
        let published = published
            .iter()
            .map(|p| PublishedSummary {
                name: p.name.clone(),
                from_version: p.from_version.to_string(),
                to_version: p.to_version.to_string(),
                changelog_head: heads(p),
            })
            .collect();

        let bumped = upgrade
            .bumps
            .iter()
            .map(|(name, dependent)| BumpedSummary {
                name: name.clone(),
                version: versions
                    .get(name)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                triggers: dependent.triggers.clone(),
            })
            .collect();

        let changes = upgrade.changes.iter().map(ToString::to_string).collect();

        let skipped = upgrade
            .skipped
            .iter()
            .map(|s| SkippedSummary {
                package: s.package.clone(),
                reason: s.error.to_string(),
            })
            .collect();

        Self {
            published,
            bumped,
            changes,
            skipped,
        }
    }

    /// Render the body with a Tera template.
    pub fn render(&self, template: &str) -> Result<String> {
        let mut tera = tera::Tera::default();
        tera.add_raw_template("pr_body", template)?;
        let context = tera::Context::from_serialize(self)?;
        Ok(tera.render("pr_body", &context)?)
    }
}
