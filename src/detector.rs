//! Source of the "what got published" report.
use log::*;
use std::{fs, io::Read, path::PathBuf};

#[cfg(test)]
use mockall::automock;

use crate::{
    Result, TalosError,
    descriptor::{PublishedPackage, parse_report},
};

/// Produces the packages published by the triggering release.
#[cfg_attr(test, automock)]
pub trait ChangeDetector {
    fn published_packages(&self) -> Result<Vec<PublishedPackage>>;
}

/// Where the line-oriented report is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    Stdin,
    File(PathBuf),
}

impl From<&str> for ReportSource {
    fn from(value: &str) -> Self {
        if value == "-" {
            ReportSource::Stdin
        } else {
            ReportSource::File(PathBuf::from(value))
        }
    }
}

/// Reads and parses a report produced by the publishing step.
pub struct ReportDetector {
    source: ReportSource,
}

impl ReportDetector {
    pub fn new(source: ReportSource) -> Self {
        Self { source }
    }

    fn read(&self) -> Result<String> {
        match &self.source {
            ReportSource::Stdin => {
                debug!("reading published report from stdin");
                let mut report = String::new();
                std::io::stdin().read_to_string(&mut report)?;
                Ok(report)
            }
            ReportSource::File(path) => {
                debug!("reading published report from {}", path.display());
                fs::read_to_string(path).map_err(|e| {
                    TalosError::InvalidArgs(format!(
                        "failed to read report {}: {e}",
                        path.display()
                    ))
                })
            }
        }
    }
}

impl ChangeDetector for ReportDetector {
    fn published_packages(&self) -> Result<Vec<PublishedPackage>> {
        let packages = parse_report(&self.read()?)?;
        for package in packages.iter() {
            info!("published: {package}");
        }
        Ok(packages)
    }
}
