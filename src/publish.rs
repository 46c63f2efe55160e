//! Publishing the approval verdict as a commit status

use crate::approval::Approvals;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{CheckState, PrRef, PullRequestInfo, StatusRequest};
use tracing::info;

/// Status the bot wants on the head commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredStatus {
    /// `success` or `failure`
    pub state: CheckState,
    /// Human description
    pub description: String,
}

/// What `publish_status` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The existing status already matched
    Unchanged,
    /// A new status was written
    Published,
}

/// Compute the approval status for a pull request.
pub fn desired_status(approvals: &Approvals, required: u32) -> DesiredStatus {
    let changes = approvals.changes_requested_count();
    if changes > 0 {
        return DesiredStatus {
            state: CheckState::Failure,
            description: format!("{changes} changes requested"),
        };
    }

    let approved = approvals.approved_count();
    let state = if approved >= required as usize {
        CheckState::Success
    } else {
        CheckState::Failure
    };
    DesiredStatus {
        state,
        description: format!("{approved} of {required} required reviews"),
    }
}

/// Write `desired` under `context` on the head commit unless it is already there.
pub async fn publish_status(
    platform: &dyn PlatformService,
    pr: &PullRequestInfo,
    desired: &DesiredStatus,
    context: &str,
) -> Result<PublishOutcome> {
    let pr_ref = PrRef {
        repo: platform.config().repo.clone(),
        number: pr.number,
    };

    let existing = platform.list_statuses(&pr.head_sha).await?;
    let need_update = existing
        .iter()
        .find(|s| s.context == context)
        .is_none_or(|s| {
            s.state != desired.state || s.description.as_deref() != Some(desired.description.as_str())
        });

    info!(
        pr = %pr_ref,
        state = %desired.state,
        description = %desired.description,
        need_update,
        "status check"
    );

    if !need_update {
        return Ok(PublishOutcome::Unchanged);
    }

    let request = StatusRequest {
        state: desired.state,
        description: desired.description.clone(),
        context: context.to_string(),
    };
    platform
        .create_status(&pr.head_sha, &request)
        .await
        .map_err(|e| Error::Publish {
            pr: pr_ref,
            context: context.to_string(),
            message: e.to_string(),
        })?;

    Ok(PublishOutcome::Published)
}
