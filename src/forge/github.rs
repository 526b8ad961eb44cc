//! Implements the Forge trait for Github
use async_trait::async_trait;
use log::*;
use octocrab::Octocrab;

use crate::{
    Result, TalosError,
    forge::{
        config::RemoteConfig,
        request::{CreatePrRequest, PullRequest},
        traits::Forge,
    },
};

/// GitHub forge implementation using Octocrab.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base_uri();
        debug!("using github api at {base_uri}");
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri)?
            .build()?;

        Ok(Self { config, instance })
    }
}

#[async_trait]
impl Forge for Github {
    async fn create_pr(&self, req: CreatePrRequest) -> Result<PullRequest> {
        info!(
            "creating pull request {} -> {} on {}/{}",
            req.head_branch, req.base_branch, self.config.owner, self.config.repo
        );

        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .send()
            .await?;

        let url = pr.html_url.map(|u| u.to_string()).ok_or_else(|| {
            TalosError::hosting(format!(
                "pull request #{} has no html url",
                pr.number
            ))
        })?;

        Ok(PullRequest {
            number: pr.number,
            url,
        })
    }
}
