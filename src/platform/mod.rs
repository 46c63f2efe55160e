//! Hosting platform services
//!
//! Provides the read/write surface the decision core needs from GitHub.

mod detection;
mod factory;
mod github;

pub use detection::parse_repo_slug;
pub use factory::create_platform_service;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    BranchUpdateState, CheckState, MergeAttempt, MergeMethod, PlatformConfig, PullRequestInfo,
    ReviewEvent, StatusCheck, StatusRequest,
};
use async_trait::async_trait;

/// Platform service trait for pull request operations
///
/// Implementations are thin wrappers over the platform API; all decisions
/// are made by the caller.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// User ids of the repository's collaborators
    async fn list_collaborators(&self) -> Result<Vec<u64>>;

    /// Reviews of a pull request, in platform order
    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<ReviewEvent>>;

    /// Latest status per context for a commit
    async fn list_statuses(&self, sha: &str) -> Result<Vec<StatusCheck>>;

    /// The platform's combined status for a commit
    async fn combined_status(&self, sha: &str) -> Result<CheckState>;

    /// Fetch the current state of a pull request
    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequestInfo>;

    /// Open pull requests targeting `base`, oldest first
    async fn list_open_pulls(&self, base: &str) -> Result<Vec<PullRequestInfo>>;

    /// How the head branch relates to its base
    async fn branch_update_state(&self, pr: &PullRequestInfo) -> Result<BranchUpdateState>;

    /// Create a commit status on `sha`
    async fn create_status(&self, sha: &str, status: &StatusRequest) -> Result<()>;

    /// Merge a pull request at `sha` with the given method
    ///
    /// Platform refusals are returned as [`MergeAttempt::Rejected`]; only
    /// transport and decoding failures are errors.
    async fn merge_pr(&self, pr_number: u64, sha: &str, method: MergeMethod)
    -> Result<MergeAttempt>;

    /// Ask the platform to merge the base into the head branch
    async fn update_branch(&self, pr_number: u64, expected_head_sha: &str) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
