//! Evaluated pull requests
//!
//! A [`PullRequestHandle`] pairs a platform snapshot with the state derived
//! from it. Derived state is recomputed as a whole and swapped in together
//! with the snapshot it came from, so the two never disagree.

use crate::approval::{Approvals, ApprovalPolicy, is_approved, reconcile_reviews};
use crate::ci::{CiStatus, resolve_ci_status};
use crate::config::BotIdentity;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::merge::merge_with_fallback;
use crate::platform::PlatformService;
use crate::priority::{self, PriorityInputs};
use crate::publish::{DesiredStatus, PublishOutcome, desired_status, publish_status};
use crate::types::{
    BranchUpdateState, CheckState, MergeOutcome, MergeableState, PrRef, PullRequestInfo,
    PullRequestSnapshot,
};
use serde::Serialize;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Gather reviews, collaborators, statuses and branch freshness for `info`.
pub async fn fetch_snapshot(
    platform: &dyn PlatformService,
    info: PullRequestInfo,
) -> Result<PullRequestSnapshot> {
    let collaborators: HashSet<u64> = platform.list_collaborators().await?.into_iter().collect();
    let reviews = platform.list_reviews(info.number).await?;
    let statuses = platform.list_statuses(&info.head_sha).await?;
    let branch_update_state = platform.branch_update_state(&info).await?;

    Ok(PullRequestSnapshot {
        repo: platform.config().repo.clone(),
        info,
        branch_update_state,
        reviews,
        statuses,
        collaborators,
    })
}

/// Everything computed from one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedState {
    /// Bumped every time the state is recomputed
    pub version: u64,
    /// Reconciled reviewer sets
    pub approvals: Approvals,
    /// Approvals required by policy
    pub required_approvals: u32,
    /// Approval gate verdict
    pub approved: bool,
    /// CI verdict
    pub ci: CiStatus,
    /// Merge priority
    pub score: i32,
}

impl DerivedState {
    /// Compute derived state for a snapshot
    pub fn compute(
        snapshot: &PullRequestSnapshot,
        policy: &ApprovalPolicy,
        bot: &BotIdentity,
        version: u64,
    ) -> Self {
        let approvals = reconcile_reviews(&snapshot.reviews, &snapshot.collaborators);
        let required_approvals =
            policy.required_approvals(&snapshot.repo.full_name(), &snapshot.info.base_ref);
        let approved = is_approved(&approvals, required_approvals);
        let ci = resolve_ci_status(&snapshot.statuses, bot);
        let score = priority::score(PriorityInputs {
            approved,
            mergeable_state: snapshot.info.mergeable_state,
            ci: ci.state,
            branch_update_state: snapshot.branch_update_state,
        });

        Self {
            version,
            approvals,
            required_approvals,
            approved,
            ci,
            score,
        }
    }
}

/// Serializable view of an evaluated pull request
#[derive(Debug, Clone, Serialize)]
pub struct PullSummary {
    /// `owner/repo/pull/N@base (...)`
    pub pretty: String,
    /// Pull request number
    pub number: u64,
    /// Title
    pub title: String,
    /// Web URL
    pub html_url: String,
    /// Base branch
    pub base_ref: String,
    /// Head commit
    pub head_sha: String,
    /// Platform mergeable-state
    pub mergeable_state: MergeableState,
    /// Branch freshness
    pub branch_update_state: BranchUpdateState,
    /// CI verdict
    pub ci_status: CheckState,
    /// Link to the deciding CI check
    pub ci_target_url: Option<String>,
    /// Merge priority
    pub score: i32,
    /// Approval gate verdict
    pub approved: bool,
    /// Approvals required by policy
    pub required_approvals: u32,
    /// Reconciled reviewer sets
    pub approvals: Approvals,
}

impl std::fmt::Display for PullSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ci={} branch={} {}",
            self.pretty, self.ci_status, self.branch_update_state, self.title
        )
    }
}

/// A pull request under evaluation, bound to the engine that evaluates it
///
/// Owned by one evaluation at a time; it is not shared between tasks.
pub struct PullRequestHandle<'a> {
    engine: &'a Engine,
    snapshot: PullRequestSnapshot,
    derived: DerivedState,
}

impl<'a> PullRequestHandle<'a> {
    /// Evaluate a snapshot supplied by the caller
    pub fn new(engine: &'a Engine, snapshot: PullRequestSnapshot) -> Self {
        let derived = DerivedState::compute(&snapshot, engine.policy(), engine.bot(), 1);
        Self {
            engine,
            snapshot,
            derived,
        }
    }

    /// Identity of the pull request
    pub fn pr_ref(&self) -> PrRef {
        self.snapshot.pr_ref()
    }

    /// Underlying snapshot
    pub const fn snapshot(&self) -> &PullRequestSnapshot {
        &self.snapshot
    }

    /// Platform fields
    pub const fn info(&self) -> &PullRequestInfo {
        &self.snapshot.info
    }

    /// Current derived state
    pub const fn derived(&self) -> &DerivedState {
        &self.derived
    }

    /// Reconciled reviewer sets
    pub const fn approvals(&self) -> &Approvals {
        &self.derived.approvals
    }

    /// Approval gate verdict
    pub const fn is_approved(&self) -> bool {
        self.derived.approved
    }

    /// CI verdict
    pub const fn ci_status(&self) -> &CiStatus {
        &self.derived.ci
    }

    /// Merge priority
    pub const fn priority(&self) -> i32 {
        self.derived.score
    }

    /// One-line description used in logs
    pub fn pretty(&self) -> String {
        let info = &self.snapshot.info;
        format!(
            "{}/{}/pull/{}@{} ({}, {}, {})",
            self.snapshot.repo.owner,
            self.snapshot.repo.name,
            info.number,
            info.base_ref,
            info.mergeable_state,
            self.derived.score,
            self.derived.approvals.approved_count()
        )
    }

    /// Re-fetch from the platform and recompute everything.
    ///
    /// Without `force`, the platform is only polled while mergeability is
    /// still unknown. On error the previous snapshot and state are kept.
    pub async fn refresh(&mut self, force: bool, cancel: &CancellationToken) -> Result<()> {
        let platform = self.engine.platform();
        let refreshed = self
            .engine
            .refresher()
            .refresh(platform, self.snapshot.info.clone(), force, cancel)
            .await?;
        let snapshot = fetch_snapshot(platform, refreshed.info).await?;
        let derived = DerivedState::compute(
            &snapshot,
            self.engine.policy(),
            self.engine.bot(),
            self.derived.version + 1,
        );
        debug!(pr = %snapshot.pr_ref(), version = derived.version, score = derived.score, "derived state replaced");

        self.snapshot = snapshot;
        self.derived = derived;
        Ok(())
    }

    /// Approval status the bot wants on the head commit
    pub fn desired_status(&self) -> DesiredStatus {
        desired_status(&self.derived.approvals, self.derived.required_approvals)
    }

    /// Publish the approval status check
    pub async fn publish_status(&self) -> Result<PublishOutcome> {
        publish_status(
            self.engine.platform(),
            &self.snapshot.info,
            &self.desired_status(),
            &self.engine.bot().reviewers_context(),
        )
        .await
    }

    /// Fail with [`Error::NotApproved`] unless the approval gate passes
    pub fn ensure_approved(&self) -> Result<()> {
        if self.derived.approved {
            return Ok(());
        }
        Err(Error::NotApproved {
            pr: self.pr_ref(),
            approved: self.derived.approvals.approved_count(),
            required: self.derived.required_approvals,
            changes_requested: self.derived.approvals.changes_requested_count(),
        })
    }

    /// Merge with the rebase-then-merge strategy
    pub async fn merge(&self) -> Result<MergeOutcome> {
        merge_with_fallback(self.engine.platform(), &self.snapshot.info).await
    }

    /// Serializable summary
    pub fn summary(&self) -> PullSummary {
        let info = &self.snapshot.info;
        PullSummary {
            pretty: self.pretty(),
            number: info.number,
            title: info.title.clone(),
            html_url: info.html_url.clone(),
            base_ref: info.base_ref.clone(),
            head_sha: info.head_sha.clone(),
            mergeable_state: info.mergeable_state,
            branch_update_state: self.snapshot.branch_update_state,
            ci_status: self.derived.ci.state,
            ci_target_url: self.derived.ci.target_url.clone(),
            score: self.derived.score,
            approved: self.derived.approved,
            required_approvals: self.derived.required_approvals,
            approvals: self.derived.approvals.clone(),
        }
    }
}

impl std::fmt::Debug for PullRequestHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullRequestHandle")
            .field("snapshot", &self.snapshot)
            .field("derived", &self.derived)
            .finish_non_exhaustive()
    }
}
