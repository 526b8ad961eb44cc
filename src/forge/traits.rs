//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::request::{CreatePrRequest, PullRequest},
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge {
    /// Open a pull request. Failures surface as
    /// [`crate::TalosError::HostingApiFailure`]; nothing is retried.
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest>;
}
