//! Lockfile regeneration through the package manager.
use async_trait::async_trait;
use log::*;
use std::path::Path;
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

use crate::{Result, TalosError, config::InstallConfig};

/// Resynchronises a package's lockfile with its manifest.
///
/// Exit code zero means the lockfile is consistent; anything else is an
/// [`TalosError::InstallFailure`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Installer {
    async fn install(&self, package_dir: &Path) -> Result<()>;
}

/// Runs the configured package manager command inside the package directory.
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
}

impl CommandInstaller {
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl Installer for CommandInstaller {
    async fn install(&self, package_dir: &Path) -> Result<()> {
        info!(
            "running {} {} in {}",
            self.program,
            self.args.join(" "),
            package_dir.display()
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(package_dir)
            .status()
            .await
            .map_err(|e| {
                error!("failed to spawn {}: {e}", self.program);
                TalosError::InstallFailure {
                    path: package_dir.to_path_buf(),
                    exit_code: None,
                }
            })?;

        if !status.success() {
            return Err(TalosError::InstallFailure {
                path: package_dir.to_path_buf(),
                exit_code: status.code(),
            });
        }

        debug!("install finished in {}", package_dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn installer(program: &str, args: &[&str]) -> CommandInstaller {
        CommandInstaller::new(&InstallConfig {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn runs_in_package_directory() {
        let tmp = TempDir::new().unwrap();
        let installer = installer("sh", &["-c", "touch package-lock.json"]);

        installer.install(tmp.path()).await.unwrap();

        assert!(tmp.path().join("package-lock.json").exists());
    }

    #[tokio::test]
    async fn non_zero_exit_is_install_failure() {
        let tmp = TempDir::new().unwrap();
        let installer = installer("sh", &["-c", "exit 3"]);

        let result = installer.install(tmp.path()).await;

        assert!(matches!(
            result,
            Err(TalosError::InstallFailure { exit_code: Some(3), .. })
        ));
    }

    #[tokio::test]
    async fn missing_program_is_install_failure() {
        let tmp = TempDir::new().unwrap();
        let installer = installer("talos-definitely-not-a-program", &[]);

        let result = installer.install(tmp.path()).await;

        assert!(matches!(
            result,
            Err(TalosError::InstallFailure { exit_code: None, .. })
        ));
    }
}
