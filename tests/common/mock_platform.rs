//! Mock platform service for testing
//!
//! These are test utilities - not all may be used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use mergebot::error::{Error, Result};
use mergebot::platform::PlatformService;
use mergebot::types::{
    BranchUpdateState, CheckState, MergeAttempt, MergeMethod, PlatformConfig, PullRequestInfo,
    ReviewEvent, StatusCheck, StatusRequest,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub sha: String,
    pub method: MergeMethod,
}

/// Call record for `create_status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStatusCall {
    pub sha: String,
    pub status: StatusRequest,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Scripted `get_pull_request` answers (to simulate mergeability settling)
/// - Call tracking for verification
/// - Status writes are visible to later reads
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    collaborators: Mutex<Vec<u64>>,
    reviews: Mutex<HashMap<u64, Vec<ReviewEvent>>>,
    statuses: Mutex<HashMap<String, Vec<StatusCheck>>>,
    combined: Mutex<HashMap<String, CheckState>>,
    pull_answers: Mutex<HashMap<u64, VecDeque<PullRequestInfo>>>,
    open_pulls: Mutex<HashMap<String, Vec<PullRequestInfo>>>,
    branch_states: Mutex<HashMap<u64, BranchUpdateState>>,
    merge_responses: Mutex<HashMap<(u64, MergeMethod), MergeAttempt>>,
    // Call tracking
    get_pull_calls: Mutex<Vec<u64>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    create_status_calls: Mutex<Vec<CreateStatusCall>>,
    update_branch_calls: Mutex<Vec<u64>>,
    // Error injection
    error_on_create_status: Mutex<Option<String>>,
    error_on_merge_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            collaborators: Mutex::new(Vec::new()),
            reviews: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            combined: Mutex::new(HashMap::new()),
            pull_answers: Mutex::new(HashMap::new()),
            open_pulls: Mutex::new(HashMap::new()),
            branch_states: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            get_pull_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            create_status_calls: Mutex::new(Vec::new()),
            update_branch_calls: Mutex::new(Vec::new()),
            error_on_create_status: Mutex::new(None),
            error_on_merge_pr: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `create_status` return an error
    pub fn fail_create_status(&self, msg: &str) {
        *self.error_on_create_status.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` return a transport error
    pub fn fail_merge_pr(&self, msg: &str) {
        *self.error_on_merge_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Response setup ===

    /// Set the collaborator ids
    pub fn set_collaborators(&self, ids: &[u64]) {
        *self.collaborators.lock().unwrap() = ids.to_vec();
    }

    /// Set the reviews for a PR
    pub fn set_reviews(&self, pr_number: u64, reviews: Vec<ReviewEvent>) {
        self.reviews.lock().unwrap().insert(pr_number, reviews);
    }

    /// Set the statuses for a commit
    pub fn set_statuses(&self, sha: &str, statuses: Vec<StatusCheck>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(sha.to_string(), statuses);
    }

    /// Set the combined status for a commit
    pub fn set_combined_status(&self, sha: &str, state: CheckState) {
        self.combined
            .lock()
            .unwrap()
            .insert(sha.to_string(), state);
    }

    /// Set the branch update state for a PR
    pub fn set_branch_state(&self, pr_number: u64, state: BranchUpdateState) {
        self.branch_states.lock().unwrap().insert(pr_number, state);
    }

    /// Script successive `get_pull_request` answers; the last one repeats
    pub fn set_pull_answers(&self, pr_number: u64, answers: Vec<PullRequestInfo>) {
        self.pull_answers
            .lock()
            .unwrap()
            .insert(pr_number, answers.into());
    }

    /// Register an open PR: listed on its base and returned by `get_pull_request`
    pub fn add_open_pull(&self, pr: PullRequestInfo) {
        self.set_pull_answers(pr.number, vec![pr.clone()]);
        self.open_pulls
            .lock()
            .unwrap()
            .entry(pr.base_ref.clone())
            .or_default()
            .push(pr);
    }

    /// Set the response for `merge_pr` for a PR and method
    pub fn set_merge_response(&self, pr_number: u64, method: MergeMethod, attempt: MergeAttempt) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert((pr_number, method), attempt);
    }

    // === Call verification methods ===

    /// Get all `get_pull_request` calls
    pub fn get_pull_calls(&self) -> Vec<u64> {
        self.get_pull_calls.lock().unwrap().clone()
    }

    /// Get all `merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Get all `create_status` calls
    pub fn get_create_status_calls(&self) -> Vec<CreateStatusCall> {
        self.create_status_calls.lock().unwrap().clone()
    }

    /// Get all `update_branch` calls
    pub fn get_update_branch_calls(&self) -> Vec<u64> {
        self.update_branch_calls.lock().unwrap().clone()
    }

    /// Assert that `merge_pr` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            !calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) NOT to be called but it was: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_collaborators(&self) -> Result<Vec<u64>> {
        Ok(self.collaborators.lock().unwrap().clone())
    }

    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<ReviewEvent>> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_statuses(&self, sha: &str) -> Result<Vec<StatusCheck>> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn combined_status(&self, sha: &str) -> Result<CheckState> {
        Ok(self
            .combined
            .lock()
            .unwrap()
            .get(sha)
            .copied()
            .unwrap_or(CheckState::Pending))
    }

    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequestInfo> {
        self.get_pull_calls.lock().unwrap().push(pr_number);
        let mut answers = self.pull_answers.lock().unwrap();
        let queue = answers
            .get_mut(&pr_number)
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} not found")))?;
        let answer = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        answer.ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} has no answers")))
    }

    async fn list_open_pulls(&self, base: &str) -> Result<Vec<PullRequestInfo>> {
        Ok(self
            .open_pulls
            .lock()
            .unwrap()
            .get(base)
            .cloned()
            .unwrap_or_default())
    }

    async fn branch_update_state(&self, pr: &PullRequestInfo) -> Result<BranchUpdateState> {
        Ok(self
            .branch_states
            .lock()
            .unwrap()
            .get(&pr.number)
            .copied()
            .unwrap_or_default())
    }

    async fn create_status(&self, sha: &str, status: &StatusRequest) -> Result<()> {
        if let Some(msg) = self.error_on_create_status.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        self.create_status_calls
            .lock()
            .unwrap()
            .push(CreateStatusCall {
                sha: sha.to_string(),
                status: status.clone(),
            });

        let mut statuses = self.statuses.lock().unwrap();
        let entry = statuses.entry(sha.to_string()).or_default();
        entry.retain(|s| s.context != status.context);
        entry.push(StatusCheck {
            context: status.context.clone(),
            state: status.state,
            description: Some(status.description.clone()),
            target_url: None,
        });
        Ok(())
    }

    async fn merge_pr(
        &self,
        pr_number: u64,
        sha: &str,
        method: MergeMethod,
    ) -> Result<MergeAttempt> {
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            pr_number,
            sha: sha.to_string(),
            method,
        });
        if let Some(msg) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self
            .merge_responses
            .lock()
            .unwrap()
            .get(&(pr_number, method))
            .cloned()
            .unwrap_or(MergeAttempt::Merged {
                sha: format!("merged_sha_{pr_number}"),
                message: None,
            }))
    }

    async fn update_branch(&self, pr_number: u64, _expected_head_sha: &str) -> Result<()> {
        self.update_branch_calls.lock().unwrap().push(pr_number);
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
