//! Core types for mergebot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Repository coordinates on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoId {
    /// Create a repository id from owner and name
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`, the form used as approval policy scope key
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Identity of a pull request: (repository, number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrRef {
    /// Repository the pull request belongs to
    pub repo: RepoId,
    /// Pull request number
    pub number: u64,
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

/// Platform-computed readiness of a pull request to merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// Not computed yet (or absent from the payload)
    #[default]
    Unknown,
    /// Mergeable, all requirements met
    Clean,
    /// Merge conflicts
    Dirty,
    /// Blocked by branch protection (reviews, required checks)
    Blocked,
    /// Head branch is out of date with the base
    Behind,
    /// Mergeable with non-passing commit statuses
    Unstable,
    /// Mergeable, with pre-receive hooks
    HasHooks,
    /// Pull request is a draft
    Draft,
}

impl MergeableState {
    /// Parse the platform's `mergeable_state` string; absent or unrecognized means `Unknown`
    pub fn from_api(value: Option<&str>) -> Self {
        match value {
            Some("clean") => Self::Clean,
            Some("dirty") => Self::Dirty,
            Some("blocked") => Self::Blocked,
            Some("behind") => Self::Behind,
            Some("unstable") => Self::Unstable,
            Some("has_hooks") => Self::HasHooks,
            Some("draft") => Self::Draft,
            Some(_) | None => Self::Unknown,
        }
    }

    /// Whether the platform has finished computing mergeability
    pub const fn is_computed(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// The platform spelling of this state
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Blocked => "blocked",
            Self::Behind => "behind",
            Self::Unstable => "unstable",
            Self::HasHooks => "has_hooks",
            Self::Draft => "draft",
        }
    }
}

impl fmt::Display for MergeableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-computed freshness of the head branch relative to its base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BranchUpdateState {
    /// Could not be determined
    #[default]
    Unknown,
    /// Branch already contains the base tip
    Clean,
    /// Branch conflicts with the base and cannot be updated
    Dirty,
    /// Branch is behind the base but can be updated
    Behind,
}

impl BranchUpdateState {
    /// Whether the platform could bring the branch up to date
    pub const fn is_updatable(self) -> bool {
        !matches!(self, Self::Unknown | Self::Dirty)
    }

    /// Lowercase name of the state
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Clean => "clean",
            Self::Dirty => "dirty",
            Self::Behind => "behind",
        }
    }
}

impl fmt::Display for BranchUpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict carried by a single review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    /// Reviewer approved
    Approved,
    /// Reviewer requested changes
    ChangesRequested,
    /// A previous review was dismissed
    Dismissed,
    /// Plain comment, no verdict
    Commented,
    /// Anything the bot does not know about
    Other(String),
}

impl ReviewVerdict {
    /// Parse the platform's review state (`APPROVED`, `CHANGES_REQUESTED`, ...)
    pub fn from_api(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            "DISMISSED" => Self::Dismissed,
            "COMMENTED" => Self::Commented,
            _ => Self::Other(value.to_string()),
        }
    }
}

/// A review event on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    /// Reviewer's platform user id
    pub user_id: u64,
    /// Reviewer's login
    pub login: String,
    /// Review verdict
    pub verdict: ReviewVerdict,
    /// Review body text
    pub body: String,
    /// Position in the platform's review ordering
    pub position: usize,
}

/// State of a commit status check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    /// Check passed
    Success,
    /// Check is running or not reported yet
    Pending,
    /// Check failed (platform `error` is folded in here)
    Failure,
}

impl CheckState {
    /// Parse a commit status state string; unknown values are treated as pending
    pub fn from_api(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "failure" | "error" => Self::Failure,
            _ => Self::Pending,
        }
    }

    /// Platform spelling of this state
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Pending => "pending",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external commit status check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
    /// Namespace/context string (e.g. `ci/jenkins`)
    pub context: String,
    /// Current state
    pub state: CheckState,
    /// Short human description
    pub description: Option<String>,
    /// Link to the check's details
    pub target_url: Option<String>,
}

/// Pull request fields as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestInfo {
    /// Pull request number
    pub number: u64,
    /// Title
    pub title: String,
    /// Web URL
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// Head commit id
    pub head_sha: String,
    /// Platform mergeable-state
    pub mergeable_state: MergeableState,
    /// Platform `mergeable` flag (`None` while computing)
    pub mergeable: Option<bool>,
    /// When the pull request was opened
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everything the decision core needs about one pull request for one cycle
#[derive(Debug, Clone)]
pub struct PullRequestSnapshot {
    /// Repository the pull request lives in
    pub repo: RepoId,
    /// Platform pull request fields
    pub info: PullRequestInfo,
    /// Branch freshness relative to the base
    pub branch_update_state: BranchUpdateState,
    /// Reviews in platform order
    pub reviews: Vec<ReviewEvent>,
    /// Latest status per context for the head commit
    pub statuses: Vec<StatusCheck>,
    /// User ids allowed to review
    pub collaborators: HashSet<u64>,
}

impl PullRequestSnapshot {
    /// Identity of this pull request
    pub fn pr_ref(&self) -> PrRef {
        PrRef {
            repo: self.repo.clone(),
            number: self.info.number,
        }
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl MergeMethod {
    /// Value of the `merge_method` request field
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Rebase => "rebase",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single merge request to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAttempt {
    /// The platform merged the pull request
    Merged {
        /// Resulting commit SHA
        sha: String,
        /// Platform message
        message: Option<String>,
    },
    /// The platform refused the merge
    Rejected {
        /// HTTP status code reported by the platform
        status_code: u16,
        /// Platform message
        message: String,
    },
}

/// A completed merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Pull request that was merged
    pub pr: PrRef,
    /// Strategy that succeeded
    pub method: MergeMethod,
    /// Resulting commit SHA
    pub sha: String,
}

/// Request body for creating a commit status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRequest {
    /// Desired state
    pub state: CheckState,
    /// Human description
    pub description: String,
    /// Status namespace
    pub context: String,
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Repository the service talks to
    pub repo: RepoId,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
