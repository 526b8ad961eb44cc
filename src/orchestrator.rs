//! End-to-end Talos pipeline.
//!
//! A run walks a fixed sequence of stages:
//!
//! ```text
//! Idle → Detecting → Upgrading → Bumping → Installing
//!      → BranchingAndCommitting → PublishingPr → UpdatingChangelogs
//!      → FinalCommit → Done
//! ```
//!
//! `Detecting` ends the run early with [`Outcome::NoWork`] when nothing was
//! published, `Upgrading` with [`Outcome::NoBumps`] when no dependent needed
//! rewriting, and the first commit with [`Outcome::NothingToCommit`] when
//! the tree turned out clean. Any other error fails the run at the stage
//! that raised it; nothing is retried or rolled back.
use chrono::{DateTime, NaiveDate, Utc};
use derive_builder::Builder;
use indexmap::IndexMap;
use log::*;
use semver::Version;
use std::{fmt, rc::Rc};

use crate::{
    Result, TalosError,
    bumper::{BumpKind, bump_packages},
    changelog::{self, ChangelogEntry},
    config::Config,
    descriptor::PublishedPackage,
    detector::ChangeDetector,
    forge::{
        request::{CreatePrRequest, PullRequest},
        summary::PrSummary,
        traits::Forge,
    },
    installer::Installer,
    repo::VersionControl,
    upgrader::{SkippedPackage, UpgradeReport, upgrade_dependencies},
    workspace::Workspace,
};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Detecting,
    Upgrading,
    Bumping,
    Installing,
    BranchingAndCommitting,
    PublishingPr,
    UpdatingChangelogs,
    FinalCommit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Detecting => "detecting published packages",
            Stage::Upgrading => "upgrading dependencies",
            Stage::Bumping => "bumping versions",
            Stage::Installing => "regenerating lockfiles",
            Stage::BranchingAndCommitting => "branching and committing",
            Stage::PublishingPr => "publishing pull request",
            Stage::UpdatingChangelogs => "updating changelogs",
            Stage::FinalCommit => "committing changelogs",
        };
        write!(f, "{name}")
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    pub branch: String,
    pub pull_request: PullRequest,
    pub bumped: IndexMap<String, Version>,
    pub skipped: Vec<SkippedPackage>,
    pub changelog_failures: Vec<(String, TalosError)>,
}

/// Successful terminal states of a run.
#[derive(Debug)]
pub enum Outcome {
    NoWork,
    NoBumps,
    NothingToCommit,
    Done(RunReport),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoWork => write!(f, "no packages were published"),
            Outcome::NoBumps => write!(f, "no packages to bump"),
            Outcome::NothingToCommit => write!(f, "nothing to commit"),
            Outcome::Done(report) => write!(
                f,
                "bumped {} package(s) in PR #{} ({})",
                report.bumped.len(),
                report.pull_request.number,
                report.pull_request.url
            ),
        }
    }
}

/// Branch name for a run started at `at`.
pub fn branch_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}", at.format("%Y%m%d%H%M%S"))
}

#[derive(Builder)]
#[builder(pattern = "owned", build_fn(private, name = "_build"))]
pub struct TalosParams {
    pub config: Rc<Config>,
    pub workspace: Rc<Workspace>,
    pub detector: Rc<dyn ChangeDetector>,
    pub installer: Rc<dyn Installer>,
    pub vcs: Rc<dyn VersionControl>,
    pub forge: Rc<dyn Forge>,
    /// Defaults to the configured prefix plus the current UTC timestamp.
    #[builder(setter(into, strip_option), default)]
    pub branch_name: Option<String>,
    /// Date recorded in changelog entries. Defaults to today in UTC.
    #[builder(setter(strip_option), default)]
    pub today: Option<NaiveDate>,
}

impl TalosParamsBuilder {
    pub fn build(self) -> Result<Talos> {
        let params = self._build().map_err(|e| {
            TalosError::invalid_config(format!("Failed to build talos: {}", e))
        })?;
        Ok(Talos::new(params))
    }
}

pub struct Talos {
    config: Rc<Config>,
    workspace: Rc<Workspace>,
    detector: Rc<dyn ChangeDetector>,
    installer: Rc<dyn Installer>,
    vcs: Rc<dyn VersionControl>,
    forge: Rc<dyn Forge>,
    branch: String,
    today: NaiveDate,
}

impl Talos {
    pub fn builder() -> TalosParamsBuilder {
        TalosParamsBuilder::default()
    }

    pub fn new(params: TalosParams) -> Self {
        let now = Utc::now();
        let branch = params
            .branch_name
            .unwrap_or_else(|| branch_name(&params.config.branch_prefix, now));
        Self {
            config: params.config,
            workspace: params.workspace,
            detector: params.detector,
            installer: params.installer,
            vcs: params.vcs,
            forge: params.forge,
            branch,
            today: params.today.unwrap_or_else(|| now.date_naive()),
        }
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Run the pipeline to a terminal state.
    pub async fn run(&self) -> Result<Outcome> {
        let mut stage = Stage::Idle;
        let result = self.run_stages(&mut stage).await;

        match &result {
            Ok(outcome) => info!("talos finished: {outcome}"),
            Err(err) => error!("talos failed while {stage}: {err}"),
        }

        result
    }

    fn enter(&self, stage: &mut Stage, next: Stage) {
        debug!("{stage} -> {next}");
        *stage = next;
    }

    async fn run_stages(&self, stage: &mut Stage) -> Result<Outcome> {
        self.enter(stage, Stage::Detecting);
        let published = self.detector.published_packages()?;
        if published.is_empty() {
            info!("No packages were published!");
            return Ok(Outcome::NoWork);
        }

        self.enter(stage, Stage::Upgrading);
        let upgrade = upgrade_dependencies(&self.workspace, &published)?;
        for skipped in upgrade.skipped.iter() {
            warn!("skipped {}: {}", skipped.package, skipped.error);
        }
        if upgrade.bumps.is_empty() {
            info!("No packages to bump!");
            return Ok(Outcome::NoBumps);
        }
        info!("dependency changes:\n{}", upgrade.diff());

        self.enter(stage, Stage::Bumping);
        let targets: Vec<_> = upgrade
            .bumps
            .iter()
            .map(|(name, dependent)| (name.clone(), dependent.dir.clone()))
            .collect();
        let versions =
            bump_packages(&self.workspace, &targets, BumpKind::Patch)?;

        self.enter(stage, Stage::Installing);
        for (_, dir) in targets.iter() {
            self.installer.install(dir).await?;
        }

        self.enter(stage, Stage::BranchingAndCommitting);
        self.vcs.checkout_branch(&self.branch)?;
        match self.vcs.commit_changes(&self.config.bump_commit_message) {
            Ok(()) => {}
            Err(TalosError::EmptyCommit(msg)) => {
                warn!("nothing changed on disk, not committing: {msg}");
                return Ok(Outcome::NothingToCommit);
            }
            Err(err) => return Err(err),
        }
        self.vcs.push_branch(&self.branch)?;

        self.enter(stage, Stage::PublishingPr);
        let pull_request = self.publish_pr(&published, &upgrade, &versions).await?;

        self.enter(stage, Stage::UpdatingChangelogs);
        let changelog_failures =
            self.update_changelogs(&upgrade, &versions, &pull_request);

        self.enter(stage, Stage::FinalCommit);
        let expect_changes = changelog_failures.len() < upgrade.bumps.len();
        match self.vcs.commit_changes(&self.config.changelog_commit_message) {
            Ok(()) => self.vcs.push_branch(&self.branch)?,
            Err(TalosError::EmptyCommit(msg)) if !expect_changes => {
                warn!("no changelog was updated, skipping commit: {msg}");
            }
            Err(err) => return Err(err),
        }

        Ok(Outcome::Done(RunReport {
            branch: self.branch.clone(),
            pull_request,
            bumped: versions,
            skipped: upgrade.skipped,
            changelog_failures,
        }))
    }

    async fn publish_pr(
        &self,
        published: &[PublishedPackage],
        upgrade: &UpgradeReport,
        versions: &IndexMap<String, Version>,
    ) -> Result<PullRequest> {
        let summary = PrSummary::new(published, upgrade, versions, |package| {
            match changelog::published_head(&self.workspace, package) {
                Ok(head) => Some(head),
                Err(err) if err.is_changelog_miss() => {
                    warn!("no changelog head for {}: {err}", package.name);
                    None
                }
                Err(err) => {
                    error!("failed to read changelog of {}: {err}", package.name);
                    None
                }
            }
        });

        let body = summary.render(&self.config.pr_body)?;

        let pull_request = self
            .forge
            .create_pr(CreatePrRequest {
                head_branch: self.branch.clone(),
                base_branch: self.config.base_branch.clone(),
                title: self.config.pr_title.clone(),
                body,
            })
            .await?;

        info!(
            "opened pull request #{}: {}",
            pull_request.number, pull_request.url
        );

        Ok(pull_request)
    }

    /// Record the run in each bumped package's changelog. Failures are
    /// collected and never stop sibling packages.
    fn update_changelogs(
        &self,
        upgrade: &UpgradeReport,
        versions: &IndexMap<String, Version>,
        pull_request: &PullRequest,
    ) -> Vec<(String, TalosError)> {
        let mut failures = vec![];

        for (name, dependent) in upgrade.bumps.iter() {
            let Some(version) = versions.get(name) else {
                failures.push((name.clone(), TalosError::UnknownPackage(name.clone())));
                continue;
            };

            let entry = ChangelogEntry {
                version: version.clone(),
                pr_number: pull_request.number,
                pr_url: pull_request.url.clone(),
                description: format!(
                    "{} - {}",
                    self.config.bump_commit_message,
                    dependent.triggers.join(", ")
                ),
                date: self.today,
            };

            if let Err(err) =
                changelog::add_entry(&self.workspace, &dependent.dir, &entry)
            {
                warn!("failed to update changelog for {name}: {err}");
                failures.push((name.clone(), err));
            }
        }

        failures
    }
}
