//! Pipeline command implementation.
use log::*;
use std::rc::Rc;

use crate::{
    Result,
    cli::Args,
    config::Config,
    detector::{ReportDetector, ReportSource},
    forge::github::Github,
    installer::CommandInstaller,
    orchestrator::{Outcome, Talos},
    repo::Repository,
    workspace::Workspace,
};

/// Read the published report, cascade the bumps and open the pull request.
pub async fn execute(args: &Args, report: &str) -> Result<()> {
    let config = Config::load(&args.repo_path, args.config.as_deref())?;
    let remote = args.get_remote()?;

    let vcs = Repository::open(
        &args.repo_path,
        &config.remote,
        Some(remote.token.clone()),
    )?;
    let workspace = Workspace::new(&args.repo_path, &config);
    let installer = CommandInstaller::new(&config.install);
    let forge = Github::new(remote)?;

    let talos = Talos::builder()
        .config(Rc::new(config))
        .workspace(Rc::new(workspace))
        .detector(Rc::new(ReportDetector::new(ReportSource::from(report))))
        .installer(Rc::new(installer))
        .vcs(Rc::new(vcs))
        .forge(Rc::new(forge))
        .build()?;

    if let Outcome::Done(report) = talos.run().await? {
        for (package, error) in report.changelog_failures.iter() {
            warn!("changelog not updated for {package}: {error}");
        }
        println!("{}", report.pull_request.url);
    }

    Ok(())
}
