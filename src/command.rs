//! Command execution for Talos.
//!
//! Each subcommand loads configuration relative to `--repo-path`, wires the
//! concrete collaborators and hands over to the library code:
//!
//! - **run**: the whole pipeline, from published report to pull request
//! - **changelog_head**: changelog rows added by one publish
//! - **bump**: the version bumper on its own

/// Patch bump of explicitly named packages.
pub mod bump;

/// Changelog head extraction for a single descriptor.
pub mod changelog_head;

/// Full pipeline run.
pub mod run;
