//! Per-branch decision cycle
//!
//! Builds the ranked queue of open pull requests for a base branch and acts
//! on its head: merge when clean, ask for a branch update when behind with
//! green CI, otherwise wait for the next event.

use crate::approval::ApprovalPolicy;
use crate::config::{BotConfig, BotIdentity};
use crate::error::{Error, MergeFailure, Result};
use crate::platform::PlatformService;
use crate::priority::select_candidate;
use crate::pull::{PullRequestHandle, PullSummary, fetch_snapshot};
use crate::publish::PublishOutcome;
use crate::refresh::MergeabilityRefresher;
use crate::types::{CheckState, MergeOutcome, MergeableState, PrRef, PullRequestSnapshot};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Decision core bound to one repository
pub struct Engine {
    platform: Arc<dyn PlatformService>,
    policy: ApprovalPolicy,
    bot: BotIdentity,
    refresher: MergeabilityRefresher,
}

/// Options for [`Engine::process_branch`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Decide but do not merge, update branches or publish statuses
    pub dry_run: bool,
}

/// What a cycle did with the head of the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleAction {
    /// No open pull requests on the branch
    NothingQueued,
    /// Head of the queue is not actionable yet
    Waiting {
        /// Head of the queue
        pr: PrRef,
        /// Why nothing was done
        reason: String,
    },
    /// Head of the queue was merged
    Merged(MergeOutcome),
    /// Merging the head of the queue failed for good
    MergeFailed(MergeFailure),
    /// The platform was asked to update the head branch
    BranchUpdated(PrRef),
    /// Dry run: would have merged
    WouldMerge(PrRef),
    /// Dry run: would have updated the branch
    WouldUpdateBranch(PrRef),
}

/// Report of one decision cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Base branch processed
    pub branch: String,
    /// Queue in priority order
    pub queue: Vec<PullSummary>,
    /// Number of status checks written
    pub statuses_published: usize,
    /// Action taken on the head of the queue
    pub action: CycleAction,
}

/// Whether a commit status event should trigger a cycle.
///
/// The bot's own statuses and pending statuses never do.
pub fn should_process_status_event(context: &str, state: CheckState, bot: &BotIdentity) -> bool {
    !bot.owns_context(context) && state != CheckState::Pending
}

impl Engine {
    /// Create an engine from a platform service and bot configuration
    pub fn new(platform: Arc<dyn PlatformService>, config: &BotConfig) -> Self {
        Self {
            platform,
            policy: ApprovalPolicy::from_config(config),
            bot: config.identity(),
            refresher: MergeabilityRefresher::from_config(&config.refresh),
        }
    }

    /// Replace the refresher
    #[must_use]
    pub fn with_refresher(mut self, refresher: MergeabilityRefresher) -> Self {
        self.refresher = refresher;
        self
    }

    /// Platform service
    pub fn platform(&self) -> &dyn PlatformService {
        self.platform.as_ref()
    }

    /// Approval policy
    pub const fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Bot identity
    pub const fn bot(&self) -> &BotIdentity {
        &self.bot
    }

    /// Mergeability refresher
    pub const fn refresher(&self) -> &MergeabilityRefresher {
        &self.refresher
    }

    /// Evaluate a caller-supplied snapshot without touching the platform
    pub fn evaluate(&self, snapshot: PullRequestSnapshot) -> PullRequestHandle<'_> {
        PullRequestHandle::new(self, snapshot)
    }

    /// Fetch and evaluate one pull request, waiting for mergeability to settle
    pub async fn load(
        &self,
        pr_number: u64,
        cancel: &CancellationToken,
    ) -> Result<PullRequestHandle<'_>> {
        let info = self.platform.get_pull_request(pr_number).await?;
        let refreshed = self
            .refresher
            .refresh(self.platform(), info, false, cancel)
            .await?;
        let snapshot = fetch_snapshot(self.platform(), refreshed.info).await?;
        Ok(self.evaluate(snapshot))
    }

    /// Open pull requests on `branch`, best candidate first.
    ///
    /// Ties keep the platform's creation order. A pull request whose
    /// mergeability does not settle within the refresher's budget stays in
    /// the queue with its unknown state, which is never eligible.
    pub async fn build_queue(
        &self,
        branch: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<PullRequestHandle<'_>>> {
        info!(repo = %self.platform.config().repo, branch, "retrieving pull requests");

        let pulls = self.platform.list_open_pulls(branch).await?;
        let mut queue = Vec::with_capacity(pulls.len());
        for info in pulls {
            let info = match self
                .refresher
                .refresh(self.platform(), info.clone(), false, cancel)
                .await
            {
                Ok(refreshed) => refreshed.info,
                // still unknown: kept in the queue, scored not eligible
                Err(Error::RefreshTimeout { pr, attempts }) => {
                    warn!(%pr, attempts, "mergeable state never settled, skipping this cycle");
                    info
                }
                Err(e) => return Err(e),
            };
            let snapshot = fetch_snapshot(self.platform(), info).await?;
            queue.push(self.evaluate(snapshot));
        }

        queue.sort_by_key(|p| std::cmp::Reverse(p.priority()));
        for p in &queue {
            info!(pr = %p.pretty(), sha = %p.info().head_sha, "queued");
        }
        info!(branch, count = queue.len(), "pull request(s) found");
        Ok(queue)
    }

    /// Run one decision cycle on `branch`.
    ///
    /// Publishes approval statuses for every queued pull request, then acts
    /// on the head of the queue. Merge failures are reported in the returned
    /// [`CycleReport`]; nothing is retried within the cycle.
    pub async fn process_branch(
        &self,
        branch: &str,
        options: ProcessOptions,
        cancel: &CancellationToken,
    ) -> Result<CycleReport> {
        let queue = self.build_queue(branch, cancel).await?;

        let mut statuses_published = 0;
        if !options.dry_run {
            for p in &queue {
                if p.publish_status().await? == PublishOutcome::Published {
                    statuses_published += 1;
                }
            }
        }

        let action = match (select_candidate(&queue, PullRequestHandle::priority), queue.first()) {
            (Some(head), _) => self.proceed(head, options).await?,
            (None, Some(first)) => CycleAction::Waiting {
                pr: first.pr_ref(),
                reason: "no eligible pull request".to_string(),
            },
            (None, None) => {
                info!(branch, "nothing queued");
                CycleAction::NothingQueued
            }
        };

        Ok(CycleReport {
            branch: branch.to_string(),
            queue: queue.iter().map(PullRequestHandle::summary).collect(),
            statuses_published,
            action,
        })
    }

    async fn proceed(
        &self,
        head: &PullRequestHandle<'_>,
        options: ProcessOptions,
    ) -> Result<CycleAction> {
        let pr = head.pr_ref();

        match head.info().mergeable_state {
            MergeableState::Clean => {
                if options.dry_run {
                    return Ok(CycleAction::WouldMerge(pr));
                }
                match head.merge().await {
                    Ok(outcome) => Ok(CycleAction::Merged(outcome)),
                    Err(Error::Merge(failure)) => Ok(CycleAction::MergeFailed(failure)),
                    Err(e) => Err(e),
                }
            }
            MergeableState::Behind => {
                let combined = self.platform.combined_status(&head.info().head_sha).await?;
                if combined != CheckState::Success {
                    return Ok(CycleAction::Waiting {
                        pr,
                        reason: format!("behind base, combined status {combined}"),
                    });
                }
                if options.dry_run {
                    return Ok(CycleAction::WouldUpdateBranch(pr));
                }
                self.platform
                    .update_branch(head.info().number, &head.info().head_sha)
                    .await?;
                info!(pr = %head.pretty(), "branch updated");
                Ok(CycleAction::BranchUpdated(pr))
            }
            state => Ok(CycleAction::Waiting {
                pr,
                reason: format!("mergeable state {state}"),
            }),
        }
    }
}
