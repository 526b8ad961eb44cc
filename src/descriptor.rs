//! Parsing of "what got published" descriptors.
//!
//! A descriptor is one line of the detector's report:
//!
//! ```text
//! @scope/name 1.2.0 → 1.3.0
//! ```
//!
//! Range modifiers (`^`, `~`) are stripped from both versions.
use semver::Version;
use std::fmt;

use crate::{Result, TalosError, workspace::strip_range_modifier};

/// Separator between the previous and the newly published version.
pub const ARROW: char = '→';

/// A package that has just been published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPackage {
    pub name: String,
    pub from_version: Version,
    pub to_version: Version,
}

impl PublishedPackage {
    /// Parse a single descriptor line.
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();

        let (name, rest) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| TalosError::malformed(line, "missing versions"))?;

        if name.contains(ARROW) {
            return Err(TalosError::malformed(
                line,
                "package name must be separated from its versions by whitespace",
            ));
        }

        let (from, to) = rest
            .split_once(ARROW)
            .ok_or_else(|| TalosError::malformed(line, "missing '→'"))?;

        if to.contains(ARROW) {
            return Err(TalosError::malformed(line, "more than one '→'"));
        }

        Ok(Self {
            name: name.to_string(),
            from_version: parse_version_token(line, from)?,
            to_version: parse_version_token(line, to)?,
        })
    }

    /// Package name without its `@scope/` prefix.
    pub fn unscoped_name(&self) -> &str {
        crate::workspace::unscoped(&self.name)
    }
}

impl fmt::Display for PublishedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {ARROW} {}",
            self.name, self.from_version, self.to_version
        )
    }
}

fn parse_version_token(line: &str, token: &str) -> Result<Version> {
    let token = strip_range_modifier(token.trim());

    if token.is_empty() {
        return Err(TalosError::malformed(line, "empty version"));
    }

    Version::parse(token).map_err(|e| {
        TalosError::malformed(line, format!("invalid version '{token}': {e}"))
    })
}

/// Parse a line-oriented report, one descriptor per non-blank line.
///
/// A single malformed line fails the whole report.
pub fn parse_report(report: &str) -> Result<Vec<PublishedPackage>> {
    report
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(PublishedPackage::parse)
        .collect()
}
