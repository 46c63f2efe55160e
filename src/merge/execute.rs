//! Merge execution - effectful operations

use crate::error::{MergeFailure, Result};
use crate::merge::strategy::{NextStep, PRIMARY_METHOD, next_step};
use crate::platform::PlatformService;
use crate::types::{MergeAttempt, MergeOutcome, PrRef, PullRequestInfo};
use tracing::{error, info, warn};

/// Merge a pull request at its head commit, rebasing first.
///
/// When the platform refuses to rebase, one plain merge is attempted and its
/// outcome is final. Any other refusal fails immediately with a
/// [`MergeFailure`]. At most two merge calls are made.
pub async fn merge_with_fallback(
    platform: &dyn PlatformService,
    pr: &PullRequestInfo,
) -> Result<MergeOutcome> {
    let pr_ref = PrRef {
        repo: platform.config().repo.clone(),
        number: pr.number,
    };

    let first = platform
        .merge_pr(pr.number, &pr.head_sha, PRIMARY_METHOD)
        .await?;

    let (method, attempt) = match next_step(PRIMARY_METHOD, &first) {
        NextStep::Retry(fallback) => {
            warn!(pr = %pr_ref, method = %PRIMARY_METHOD, %fallback, "branch can't be rebased, retrying");
            let second = platform.merge_pr(pr.number, &pr.head_sha, fallback).await?;
            (fallback, second)
        }
        NextStep::Done | NextStep::Fail => (PRIMARY_METHOD, first),
    };

    match attempt {
        MergeAttempt::Merged { sha, .. } => {
            info!(pr = %pr_ref, %method, sha = %sha, "merged");
            Ok(MergeOutcome {
                pr: pr_ref,
                method,
                sha,
            })
        }
        MergeAttempt::Rejected {
            status_code,
            message,
        } => {
            error!(pr = %pr_ref, %method, status_code, message = %message, "merge fail");
            Err(MergeFailure {
                pr: pr_ref,
                method,
                fell_back: method != PRIMARY_METHOD,
                status_code,
                message,
            }
            .into())
        }
    }
}
