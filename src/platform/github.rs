//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    BranchUpdateState, CheckState, MergeAttempt, MergeMethod, MergeableState, PlatformConfig,
    PullRequestInfo, RepoId, ReviewEvent, ReviewVerdict, StatusCheck, StatusRequest,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

const PER_PAGE: u8 = 100;

/// GitHub service using octocrab for typed reads and raw requests elsewhere
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests
    token: String,
    /// HTTP client for raw requests (statuses, merge, compare)
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, repo: RepoId, host: Option<String>) -> Result<Self> {
        let api_base = host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::build(token, repo, host, api_base)
    }

    /// Create a service talking to an explicit API base URL
    pub fn with_api_base(token: &str, repo: RepoId, api_base: &str) -> Result<Self> {
        Self::build(
            token,
            repo,
            None,
            api_base.trim_end_matches('/').to_string(),
        )
    }

    fn build(token: &str, repo: RepoId, host: Option<String>, api_base: String) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("mergebot")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig { repo, host },
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn owner(&self) -> &str {
        &self.config.repo.owner
    }

    fn repo_name(&self) -> &str {
        &self.config.repo.name
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            self.owner(),
            self.repo_name(),
            path
        );
        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Read the `message` field of an error body, falling back to the status text
    async fn error_message(response: reqwest::Response) -> (u16, String) {
        let status = response.status();
        let message = response
            .json::<ApiMessage>()
            .await
            .ok()
            .map(|m| m.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        (status.as_u16(), message)
    }

    async fn fetch_combined_status(&self, sha: &str) -> Result<CombinedStatus> {
        let response = self
            .request(Method::GET, &format!("commits/{sha}/status"))
            .query(&[("per_page", PER_PAGE)])
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = Self::error_message(response).await;
            return Err(Error::GitHubApi(format!(
                "Failed to fetch commit status: {status}, {message}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse commit status: {e}")))
    }
}

#[derive(Deserialize)]
struct CombinedStatus {
    state: String,
    total_count: u32,
    statuses: Vec<RawStatus>,
}

#[derive(Deserialize)]
struct RawStatus {
    context: String,
    state: String,
    description: Option<String>,
    target_url: Option<String>,
}

/// Platform spelling of an octocrab enum (its serde name)
fn api_name<T: serde::Serialize>(value: &T) -> Option<String> {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(ToString::to_string))
}

/// Helper to convert octocrab PR to our `PullRequestInfo` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequestInfo {
    let mergeable_state =
        MergeableState::from_api(pr.mergeable_state.as_ref().and_then(api_name).as_deref());

    PullRequestInfo {
        number: pr.number,
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        head_sha: pr.head.sha.clone(),
        mergeable_state,
        mergeable: pr.mergeable,
        created_at: pr.created_at,
        updated_at: pr.updated_at,
    }
}

fn verdict_from_octocrab(state: Option<&octocrab::models::pulls::ReviewState>) -> ReviewVerdict {
    state
        .and_then(api_name)
        .map_or_else(|| ReviewVerdict::Other("none".to_string()), |s| ReviewVerdict::from_api(&s))
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_collaborators(&self) -> Result<Vec<u64>> {
        #[derive(Deserialize)]
        struct Collaborator {
            id: u64,
        }

        debug!("listing collaborators");
        let mut ids = Vec::new();
        let mut page = 1u32;
        loop {
            let response = self
                .request(Method::GET, "collaborators")
                .query(&[("per_page", u32::from(PER_PAGE)), ("page", page)])
                .send()
                .await?;

            if !response.status().is_success() {
                let (status, message) = Self::error_message(response).await;
                return Err(Error::GitHubApi(format!(
                    "Failed to list collaborators: {status}, {message}"
                )));
            }

            let batch: Vec<Collaborator> = response
                .json()
                .await
                .map_err(|e| Error::GitHubApi(format!("Failed to parse collaborators: {e}")))?;
            let done = batch.len() < usize::from(PER_PAGE);
            ids.extend(batch.into_iter().map(|c| c.id));
            if done {
                break;
            }
            page += 1;
        }

        debug!(count = ids.len(), "listed collaborators");
        Ok(ids)
    }

    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<ReviewEvent>> {
        debug!(pr_number, "listing reviews");
        let page = self
            .client
            .pulls(self.owner(), self.repo_name())
            .list_reviews(pr_number)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let reviews = self.client.all_pages(page).await?;

        let result: Vec<ReviewEvent> = reviews
            .into_iter()
            .enumerate()
            .filter_map(|(position, review)| {
                let user = review.user?;
                Some(ReviewEvent {
                    user_id: user.id.0,
                    login: user.login,
                    verdict: verdict_from_octocrab(review.state.as_ref()),
                    body: review.body.unwrap_or_default(),
                    position,
                })
            })
            .collect();
        debug!(pr_number, count = result.len(), "listed reviews");
        Ok(result)
    }

    async fn list_statuses(&self, sha: &str) -> Result<Vec<StatusCheck>> {
        debug!(sha, "listing statuses");
        let combined = self.fetch_combined_status(sha).await?;
        Ok(combined
            .statuses
            .into_iter()
            .map(|s| StatusCheck {
                state: CheckState::from_api(&s.state),
                context: s.context,
                description: s.description,
                target_url: s.target_url,
            })
            .collect())
    }

    async fn combined_status(&self, sha: &str) -> Result<CheckState> {
        let combined = self.fetch_combined_status(sha).await?;
        debug!(sha, state = %combined.state, count = combined.total_count, "combined status");
        if combined.total_count == 0 {
            return Ok(CheckState::Pending);
        }
        Ok(CheckState::from_api(&combined.state))
    }

    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequestInfo> {
        debug!(pr_number, "getting pull request");
        let pr = self
            .client
            .pulls(self.owner(), self.repo_name())
            .get(pr_number)
            .await?;

        let info = pr_from_octocrab(&pr);
        debug!(pr_number, mergeable_state = %info.mergeable_state, "got pull request");
        Ok(info)
    }

    async fn list_open_pulls(&self, base: &str) -> Result<Vec<PullRequestInfo>> {
        debug!(base, "listing open pull requests");
        let page = self
            .client
            .pulls(self.owner(), self.repo_name())
            .list()
            .state(octocrab::params::State::Open)
            .base(base)
            .sort(octocrab::params::pulls::Sort::Created)
            .direction(octocrab::params::Direction::Ascending)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let pulls = self.client.all_pages(page).await?;

        let result: Vec<PullRequestInfo> = pulls.iter().map(pr_from_octocrab).collect();
        debug!(base, count = result.len(), "listed open pull requests");
        Ok(result)
    }

    async fn branch_update_state(&self, pr: &PullRequestInfo) -> Result<BranchUpdateState> {
        #[derive(Deserialize)]
        struct Comparison {
            behind_by: u64,
        }

        match pr.mergeable {
            Some(false) => return Ok(BranchUpdateState::Dirty),
            None => return Ok(BranchUpdateState::Unknown),
            Some(true) => {}
        }

        let response = self
            .request(
                Method::GET,
                &format!(
                    "compare/{}...{}",
                    urlencoding::encode(&pr.base_ref),
                    pr.head_sha
                ),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            debug!(
                status = %response.status(),
                pr_number = pr.number,
                "compare returned non-success, branch state unknown"
            );
            return Ok(BranchUpdateState::Unknown);
        }

        let comparison: Comparison = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse comparison: {e}")))?;

        let state = if comparison.behind_by == 0 {
            BranchUpdateState::Clean
        } else {
            BranchUpdateState::Behind
        };
        debug!(pr_number = pr.number, behind_by = comparison.behind_by, %state, "compared branch");
        Ok(state)
    }

    async fn create_status(&self, sha: &str, status: &StatusRequest) -> Result<()> {
        debug!(sha, context = %status.context, state = %status.state, "creating status");
        let response = self
            .request(Method::POST, &format!("statuses/{sha}"))
            .json(status)
            .send()
            .await?;

        if !response.status().is_success() {
            let (code, message) = Self::error_message(response).await;
            return Err(Error::GitHubApi(format!(
                "Failed to create status: {code}, {message}"
            )));
        }
        Ok(())
    }

    async fn merge_pr(
        &self,
        pr_number: u64,
        sha: &str,
        method: MergeMethod,
    ) -> Result<MergeAttempt> {
        #[derive(Deserialize)]
        struct MergeResponse {
            sha: String,
            message: Option<String>,
        }

        debug!(pr_number, sha, %method, "merging PR");
        let response = self
            .request(Method::PUT, &format!("pulls/{pr_number}/merge"))
            .json(&serde_json::json!({
                "sha": sha,
                "merge_method": method.as_str(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status_code, message) = Self::error_message(response).await;
            debug!(pr_number, %method, status_code, message = %message, "merge rejected");
            return Ok(MergeAttempt::Rejected {
                status_code,
                message,
            });
        }

        let merged: MergeResponse = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse merge response: {e}")))?;

        debug!(pr_number, sha = %merged.sha, "merge complete");
        Ok(MergeAttempt::Merged {
            sha: merged.sha,
            message: merged.message,
        })
    }

    async fn update_branch(&self, pr_number: u64, expected_head_sha: &str) -> Result<()> {
        debug!(pr_number, expected_head_sha, "updating branch");
        let response = self
            .request(Method::PUT, &format!("pulls/{pr_number}/update-branch"))
            .json(&serde_json::json!({ "expected_head_sha": expected_head_sha }))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = Self::error_message(response).await;
            return Err(Error::GitHubApi(format!(
                "Failed to update branch: {status}, {message}"
            )));
        }
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
