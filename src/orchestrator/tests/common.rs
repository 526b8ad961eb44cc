//! Common test utilities for orchestrator tests.

use chrono::NaiveDate;
use std::{
    rc::Rc,
    sync::{Arc, Mutex},
};

use crate::{
    descriptor::parse_report,
    detector::MockChangeDetector,
    forge::{request::PullRequest, traits::MockForge},
    installer::MockInstaller,
    orchestrator::Talos,
    repo::MockVersionControl,
};

pub use crate::{
    TalosError,
    orchestrator::Outcome,
    test_helpers::{TestRepo, changelog},
};

pub const BRANCH: &str = "talos-bump-test";
pub const PR_URL: &str = "https://github.com/bbc/psammead/pull/7";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

pub fn pull_request() -> PullRequest {
    PullRequest {
        number: 7,
        url: PR_URL.into(),
    }
}

/// Workspace where `@bbc/a` was just published at 2.0.0. `@bbc/b` and
/// `@bbc/c` depend on it, `@bbc/d` does not.
pub fn psammead() -> TestRepo {
    let repo = TestRepo::new();
    repo.add_package("@bbc/a", "2.0.0", &[]);
    repo.add_package("@bbc/b", "1.0.0", &[("@bbc/a", "^1.0.0")]);
    repo.add_package("@bbc/c", "0.3.2", &[("@bbc/a", "~1.0.0")]);
    repo.add_package("@bbc/d", "4.1.0", &[("@bbc/e", "^3.0.0")]);

    repo.add_changelog(
        "@bbc/a",
        &changelog("a", &[("2.0.0", "Breaking change"), ("1.0.0", "Initial")]),
    );
    repo.add_changelog("@bbc/b", &changelog("b", &[("1.0.0", "Initial")]));
    repo.add_changelog("@bbc/c", &changelog("c", &[("0.3.2", "Fix")]));
    repo
}

pub const PUBLISHED_A: &str = "@bbc/a 1.0.0 → 2.0.0\n";

pub fn detector(report: &str) -> MockChangeDetector {
    let packages = parse_report(report).unwrap();
    let mut detector = MockChangeDetector::new();
    detector
        .expect_published_packages()
        .times(1)
        .returning(move || Ok(packages.clone()));
    detector
}

pub fn passing_installer() -> MockInstaller {
    let mut installer = MockInstaller::new();
    installer.expect_install().returning(|_| Ok(()));
    installer
}

pub fn forge_returning_pr() -> MockForge {
    let mut forge = MockForge::new();
    forge
        .expect_create_pr()
        .times(1)
        .returning(|_| Ok(pull_request()));
    forge
}

/// Commit messages and pushed branches observed by a mock VCS.
#[derive(Default, Clone)]
pub struct VcsLog {
    pub commits: Arc<Mutex<Vec<String>>>,
    pub pushes: Arc<Mutex<Vec<String>>>,
}

impl VcsLog {
    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().unwrap().clone()
    }
}

/// Mock VCS that accepts every call and records it.
pub fn recording_vcs(log: &VcsLog) -> MockVersionControl {
    let mut vcs = MockVersionControl::new();
    vcs.expect_checkout_branch()
        .withf(|branch| branch == BRANCH)
        .times(1)
        .returning(|_| Ok(()));

    let commits = Arc::clone(&log.commits);
    vcs.expect_commit_changes().returning(move |message| {
        commits.lock().unwrap().push(message.to_string());
        Ok(())
    });

    let pushes = Arc::clone(&log.pushes);
    vcs.expect_push_branch().returning(move |branch| {
        pushes.lock().unwrap().push(branch.to_string());
        Ok(())
    });
    vcs
}

/// Mock VCS that must never be touched.
pub fn untouched_vcs() -> MockVersionControl {
    let mut vcs = MockVersionControl::new();
    vcs.expect_checkout_branch().times(0);
    vcs.expect_commit_changes().times(0);
    vcs.expect_push_branch().times(0);
    vcs
}

pub fn create_talos(
    repo: &TestRepo,
    detector: MockChangeDetector,
    installer: MockInstaller,
    vcs: MockVersionControl,
    forge: MockForge,
) -> Talos {
    Talos::builder()
        .config(Rc::new(repo.config().clone()))
        .workspace(Rc::new(repo.workspace()))
        .detector(Rc::new(detector))
        .installer(Rc::new(installer))
        .vcs(Rc::new(vcs))
        .forge(Rc::new(forge))
        .branch_name(BRANCH)
        .today(today())
        .build()
        .unwrap()
}

pub fn expect_done(outcome: Outcome) -> crate::orchestrator::RunReport {
    match outcome {
        Outcome::Done(report) => report,
        other => panic!("expected a completed run, got: {other}"),
    }
}
