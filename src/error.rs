//! Error taxonomy for Talos runs.
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Talos operations.
#[derive(Error, Debug)]
pub enum TalosError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    // Published report errors
    #[error("Malformed package descriptor '{line}': {reason}")]
    MalformedDescriptor { line: String, reason: String },

    // Manifest errors
    #[error("Failed to read manifest {}: {reason}", .path.display())]
    ManifestReadFailure { path: PathBuf, reason: String },

    #[error("Failed to write manifest {}: {reason}", .path.display())]
    ManifestWriteFailure { path: PathBuf, reason: String },

    #[error("No manifest found for package: {0}")]
    UnknownPackage(String),

    #[error("Invalid version '{version}' for package {package}")]
    InvalidVersion { package: String, version: String },

    // Lockfile regeneration errors
    #[error("Install failed in {} (exit code: {})", .path.display(), exit_code_label(.exit_code))]
    InstallFailure {
        path: PathBuf,
        exit_code: Option<i32>,
    },

    // Version control errors
    #[error("Git operation failed: {0}")]
    GitOperationFailure(String),

    #[error("Nothing to commit for: {0}")]
    EmptyCommit(String),

    // Hosting API errors
    #[error("Hosting API request failed: {0}")]
    HostingApiFailure(String),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    // Changelog errors
    #[error("No changelog found for package: {0}")]
    ChangelogNotFound(String),

    #[error("Malformed changelog: {0}")]
    MalformedChangelog(String),

    #[error("Version {0} not found in changelog")]
    TargetVersionNotFound(String),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "none".into())
}

/// Result type alias using TalosError
pub type Result<T> = std::result::Result<T, TalosError>;

impl TalosError {
    /// Create a malformed descriptor error
    pub fn malformed(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a hosting API error
    pub fn hosting(msg: impl Into<String>) -> Self {
        Self::HostingApiFailure(msg.into())
    }

    /// Errors that only affect one package's changelog and never the run.
    pub fn is_changelog_miss(&self) -> bool {
        matches!(
            self,
            Self::ChangelogNotFound(_)
                | Self::MalformedChangelog(_)
                | Self::TargetVersionNotFound(_)
        )
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for TalosError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<git2::Error> for TalosError {
    fn from(err: git2::Error) -> Self {
        Self::GitOperationFailure(err.message().to_string())
    }
}

impl From<octocrab::Error> for TalosError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => Self::HostingApiFailure(
                format!("GitHub API error ({}): {}", source.status_code, source.message),
            ),
            _ => Self::HostingApiFailure(format!("GitHub API error: {}", err)),
        }
    }
}

impl From<git_url_parse::GitUrlParseError> for TalosError {
    fn from(err: git_url_parse::GitUrlParseError) -> Self {
        Self::InvalidArgs(format!("invalid git url: {}", err))
    }
}

impl From<log::SetLoggerError> for TalosError {
    fn from(err: log::SetLoggerError) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}
