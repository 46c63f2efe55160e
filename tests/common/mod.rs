//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{CreateStatusCall, MergePrCall, MockPlatformService};

use mergebot::config::BotConfig;
use mergebot::types::{
    BranchUpdateState, CheckState, MergeableState, PlatformConfig, PullRequestInfo,
    PullRequestSnapshot, RepoId, ReviewEvent, ReviewVerdict, StatusCheck,
};
use std::collections::HashMap;

/// Platform config for `acme/widgets` on github.com
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        repo: RepoId::new("acme", "widgets"),
        host: None,
    }
}

/// Bot config with fast refresh and the given default approval count
pub fn bot_config(required: u32) -> BotConfig {
    let mut config = BotConfig {
        default_required_approvals: required,
        required_approvals: HashMap::new(),
        ..BotConfig::default()
    };
    config.refresh.max_attempts = 5;
    config.refresh.interval_ms = 1;
    config
}

/// A PR targeting `main` with head `sha-<number>`
pub fn make_pr(number: u64, state: MergeableState) -> PullRequestInfo {
    PullRequestInfo {
        number,
        title: format!("Change {number}"),
        html_url: format!("https://github.com/acme/widgets/pull/{number}"),
        base_ref: "main".to_string(),
        head_ref: format!("feature-{number}"),
        head_sha: format!("sha-{number}"),
        mergeable_state: state,
        mergeable: state.is_computed().then_some(state != MergeableState::Dirty),
        created_at: None,
        updated_at: None,
    }
}

/// A review by collaborator `user_id`
pub fn review(user_id: u64, login: &str, verdict: ReviewVerdict, position: usize) -> ReviewEvent {
    ReviewEvent {
        user_id,
        login: login.to_string(),
        verdict,
        body: String::new(),
        position,
    }
}

/// A status check
pub fn status(context: &str, state: CheckState) -> StatusCheck {
    StatusCheck {
        context: context.to_string(),
        state,
        description: None,
        target_url: Some(format!("https://ci.example/{context}")),
    }
}

/// A snapshot of `acme/widgets` where users 1, 2 and 3 are collaborators
pub fn make_snapshot(
    pr: PullRequestInfo,
    reviews: Vec<ReviewEvent>,
    statuses: Vec<StatusCheck>,
    branch_update_state: BranchUpdateState,
) -> PullRequestSnapshot {
    PullRequestSnapshot {
        repo: RepoId::new("acme", "widgets"),
        info: pr,
        branch_update_state,
        reviews,
        statuses,
        collaborators: [1, 2, 3].into_iter().collect(),
    }
}
