//! Talos cascades freshly published package versions through a monorepo.
//!
//! After a publish, every package depending on a published one gets its
//! dependency range rewritten and a patch bump, lockfiles are regenerated,
//! and the result is committed and proposed as a single pull request whose
//! number is then recorded in each bumped package's changelog.

pub mod bumper;
pub mod changelog;
pub mod cli;
pub mod command;
pub mod config;
pub mod descriptor;
pub mod detector;
pub mod error;
pub mod forge;
pub mod installer;
pub mod orchestrator;
pub mod repo;
pub mod upgrader;
pub mod workspace;

pub use error::{Result, TalosError};

#[cfg(test)]
pub mod test_helpers;
