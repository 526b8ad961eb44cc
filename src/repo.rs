//! Git operations on the local working tree.
//!
//! The pipeline needs three primitives from version control: switch to the
//! run branch, commit everything pending, and publish the branch so the pull
//! request can reference it. [`VersionControl`] is that contract and
//! [`Repository`] implements it with `git2` against the already checked out
//! repository.
use git2::{BranchType, RemoteCallbacks};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::{Result, TalosError};

#[cfg_attr(test, automock)]
pub trait VersionControl {
    /// Create `branch` from HEAD if needed and check it out.
    fn checkout_branch(&self, branch: &str) -> Result<()>;
    /// Stage every working tree change and commit it. Fails with
    /// [`TalosError::EmptyCommit`] when nothing changed.
    fn commit_changes(&self, message: &str) -> Result<()>;
    /// Push `branch` to the configured remote.
    fn push_branch(&self, branch: &str) -> Result<()>;
}

/// Create Git authentication callbacks for username/token authentication.
fn get_auth_callbacks<'r>(user: String, token: String) -> RemoteCallbacks<'r> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        git2::Cred::userpass_plaintext(&user, &token)
    });
    callbacks
}

/// Wrapper around the repository checked out at the workspace root.
pub struct Repository {
    repo: git2::Repository,
    remote: String,
    token: Option<SecretString>,
}

impl Repository {
    /// Open the repository containing `path`.
    pub fn open(
        path: &Path,
        remote: &str,
        token: Option<SecretString>,
    ) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;
        debug!(
            "opened repository at {}",
            repo.workdir().unwrap_or(repo.path()).display()
        );
        Ok(Self {
            repo,
            remote: remote.to_string(),
            token,
        })
    }

    fn switch_branch(&self, branch: &str) -> Result<()> {
        info!("switching to branch: {branch}");
        let ref_name = format!("refs/heads/{}", branch);
        let target_obj = self.repo.revparse_single(&ref_name)?;
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.safe();
        self.repo.checkout_tree(&target_obj, Some(&mut checkout))?;
        self.repo.set_head(&ref_name)?;
        Ok(())
    }

    fn add_all(&self) -> Result<git2::Oid> {
        debug!("adding changed files to index");
        let mut index = self.repo.index()?;
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(index.write_tree()?)
    }
}

impl VersionControl for Repository {
    fn checkout_branch(&self, branch: &str) -> Result<()> {
        if self.repo.find_branch(branch, BranchType::Local).is_err() {
            info!("creating branch: {branch}");
            let head = self.repo.head()?;
            let commit = head.peel_to_commit()?;
            self.repo.branch(branch, &commit, false)?;
        }
        self.switch_branch(branch)
    }

    fn commit_changes(&self, message: &str) -> Result<()> {
        let tree_id = self.add_all()?;
        let parent_commit = self.repo.head()?.peel_to_commit()?;

        if parent_commit.tree_id() == tree_id {
            return Err(TalosError::EmptyCommit(message.to_string()));
        }

        debug!("committing changes with msg: {message}");
        let tree = self.repo.find_tree(tree_id)?;
        let committer = self.repo.signature()?;
        let oid = self.repo.commit(
            Some("HEAD"),
            &committer,
            &committer,
            message,
            &tree,
            &[&parent_commit],
        )?;
        info!("committed {oid}: {message}");
        Ok(())
    }

    fn push_branch(&self, branch: &str) -> Result<()> {
        info!("pushing branch {branch} to {}", self.remote);
        let mut push_opts = git2::PushOptions::default();

        if let Some(token) = &self.token {
            let config = self.repo.config()?.snapshot()?;
            let user = config
                .get_str("user.name")
                .map(str::to_string)
                .unwrap_or_else(|_| "x-access-token".into());
            let callbacks =
                get_auth_callbacks(user, token.expose_secret().to_string());
            push_opts.remote_callbacks(callbacks);
        }

        let mut remote = self.repo.find_remote(&self.remote)?;
        let ref_spec = format!("refs/heads/{branch}:refs/heads/{branch}");
        remote.push(&[ref_spec], Some(&mut push_opts))?;
        Ok(())
    }
}
