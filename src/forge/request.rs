#[derive(Debug, Clone, PartialEq, Eq)]
/// Pull request opened for a run.
pub struct PullRequest {
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}
