//! Reading and writing per-package changelog tables.
//!
//! Changelogs hold a Markdown table whose header names a `Version` and a
//! `Description` column, newest row first:
//!
//! ```text
//! | Version | Description |
//! |---------|-------------|
//! | 2.0.0 | [PR#12](https://github.com/org/repo/pull/12) Breaking change |
//! | 1.0.0 | [PR#1](https://github.com/org/repo/pull/1) Initial release |
//! ```
use chrono::NaiveDate;
use log::*;
use regex::Regex;
use semver::Version;
use std::{path::Path, sync::LazyLock};

use crate::{
    Result, TalosError, descriptor::PublishedPackage, workspace::Workspace,
};

static VERSION_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s*Version\s*\|").unwrap());

static DESCRIPTION_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s*Description\s*\|").unwrap());

static SEPARATOR_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|[\s:\-|]+\|\s*$").unwrap());

/// Whether a line is the changelog table header, in either column order.
pub fn is_table_header(line: &str) -> bool {
    VERSION_COLUMN.is_match(line) && DESCRIPTION_COLUMN.is_match(line)
}

/// Extract the block of lines from the table header down to, but excluding,
/// the first line at or after it that mentions `version`.
pub fn changelog_head(content: &str, version: &str) -> Result<String> {
    let lines: Vec<&str> = content.split('\n').collect();

    let header = lines.iter().position(|l| is_table_header(l)).ok_or_else(
        || {
            TalosError::MalformedChangelog(
                "no version/description table header".into(),
            )
        },
    )?;

    let first_version = lines[header..]
        .iter()
        .position(|l| l.contains(version))
        .map(|offset| header + offset)
        .ok_or_else(|| TalosError::TargetVersionNotFound(version.to_string()))?;

    Ok(lines[header..first_version].join("\n"))
}

/// Changelog head of a published package, i.e. the rows added since its
/// previous version.
pub fn published_head(
    workspace: &Workspace,
    package: &PublishedPackage,
) -> Result<String> {
    let (_, content) = workspace.read_changelog(&package.name)?;
    changelog_head(&content, &package.from_version.to_string())
}

/// A changelog row to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub version: Version,
    pub pr_number: u64,
    pub pr_url: String,
    pub description: String,
    pub date: NaiveDate,
}

impl ChangelogEntry {
    pub fn row(&self) -> String {
        format!(
            "| {} | [PR#{}]({}) {} ({}) |",
            self.version,
            self.pr_number,
            self.pr_url,
            self.description,
            self.date.format("%Y-%m-%d")
        )
    }
}

/// Insert `row` as the newest table row: directly below the separator row,
/// or below the header when the table has no separator.
pub fn insert_row(content: &str, row: &str) -> Option<String> {
    let mut lines: Vec<&str> = content.split('\n').collect();

    let header = lines.iter().position(|l| is_table_header(l))?;

    let mut insert_at = header + 1;
    if lines.get(insert_at).is_some_and(|l| SEPARATOR_ROW.is_match(l)) {
        insert_at += 1;
    }

    lines.insert(insert_at, row);
    Some(lines.join("\n"))
}

/// Record `entry` in the changelog of the package living in `package_dir`.
pub fn add_entry(
    workspace: &Workspace,
    package_dir: &Path,
    entry: &ChangelogEntry,
) -> Result<()> {
    let (path, content) = workspace.read_changelog_in(package_dir)?;

    let updated = insert_row(&content, &entry.row()).ok_or_else(|| {
        TalosError::MalformedChangelog(format!(
            "{}: no version/description table header",
            path.display()
        ))
    })?;

    workspace.write_changelog(&path, &updated)?;
    info!("updated {}: {}", path.display(), entry.version);

    Ok(())
}
