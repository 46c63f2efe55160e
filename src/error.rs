//! Error types for mergebot

use crate::types::{MergeMethod, PrRef};
use thiserror::Error;

/// A merge the platform refused for good
///
/// Carries everything an operator needs to diagnose the failure without
/// going back to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pr} merge failed ({method}{}): {status_code}, {message}", fallback_note(.fell_back))]
pub struct MergeFailure {
    /// Pull request that failed to merge
    pub pr: PrRef,
    /// Strategy of the final attempt
    pub method: MergeMethod,
    /// Whether the final attempt was the fallback strategy
    pub fell_back: bool,
    /// HTTP status code reported by the platform
    pub status_code: u16,
    /// Platform message
    pub message: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn fallback_note(fell_back: &bool) -> &'static str {
    if *fell_back {
        ", after rebase was refused"
    } else {
        ""
    }
}

/// Errors that can occur in mergebot
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub API error with a free-form message
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Error surfaced by octocrab
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// Raw HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No usable token
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository slug could not be parsed
    #[error("invalid repository: {0}")]
    InvalidRepo(String),

    /// Mergeability never settled within the attempt budget
    #[error("{pr}: mergeable state still unknown after {attempts} refresh attempt(s)")]
    RefreshTimeout {
        /// Pull request being refreshed
        pr: PrRef,
        /// Attempts made
        attempts: u32,
    },

    /// Refresh was cancelled by the caller
    #[error("{pr}: refresh cancelled")]
    Cancelled {
        /// Pull request being refreshed
        pr: PrRef,
    },

    /// Terminal merge failure
    #[error(transparent)]
    Merge(#[from] MergeFailure),

    /// Pull request does not pass the approval gate
    #[error("{pr}: not approved ({approved} of {required} required reviews, {changes_requested} changes requested)")]
    NotApproved {
        /// Pull request that was refused
        pr: PrRef,
        /// Approving reviewers
        approved: usize,
        /// Approvals required by policy
        required: u32,
        /// Reviewers requesting changes
        changes_requested: usize,
    },

    /// Status check write was rejected
    #[error("{pr}: failed to publish status '{context}': {message}")]
    Publish {
        /// Pull request whose head commit was targeted
        pr: PrRef,
        /// Status context
        context: String,
        /// Underlying error message
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mergebot operations
pub type Result<T> = std::result::Result<T, Error>;
