//! Waiting for the platform to finish computing mergeability
//!
//! The platform computes `mergeable_state` lazily after pushes and base
//! changes. Until then it reports `unknown`; the refresher re-fetches the pull
//! request until the value settles, bounded by an attempt budget and a
//! cancellation token.

use crate::config::RefreshConfig;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{PrRef, PullRequestInfo};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where a pull request is in the refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Mergeability not computed, or a refresh was forced
    Stale,
    /// Re-fetching from the platform
    Refreshing,
    /// Mergeability is computed
    Fresh,
}

impl RefreshState {
    /// Starting state for a pull request
    pub const fn initial(info: &PullRequestInfo, force: bool) -> Self {
        if !force && info.mergeable_state.is_computed() {
            Self::Fresh
        } else {
            Self::Stale
        }
    }
}

/// Result of a refresh
#[derive(Debug, Clone)]
pub struct Refreshed {
    /// Pull request with computed mergeability
    pub info: PullRequestInfo,
    /// Number of platform re-fetches performed
    pub attempts: u32,
}

/// Bounded poller for platform mergeability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeabilityRefresher {
    max_attempts: u32,
    interval: Duration,
}

impl Default for MergeabilityRefresher {
    fn default() -> Self {
        Self::from_config(&RefreshConfig::default())
    }
}

impl MergeabilityRefresher {
    /// Create a refresher; at least one attempt is always made
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Create a refresher from configuration
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.max_attempts, config.interval())
    }

    /// Maximum re-fetches per refresh
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Make sure `current` has a computed mergeable state.
    ///
    /// Returns immediately when it already has one and `force` is false.
    pub async fn refresh(
        &self,
        platform: &dyn PlatformService,
        current: PullRequestInfo,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<Refreshed> {
        if RefreshState::initial(&current, force) == RefreshState::Fresh {
            return Ok(Refreshed {
                info: current,
                attempts: 0,
            });
        }

        let pr = PrRef {
            repo: platform.config().repo.clone(),
            number: current.number,
        };
        let mut state = RefreshState::Refreshing;
        debug!(%pr, ?state, force, "mergeable state stale");

        for attempt in 1..=self.max_attempts {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled { pr });
            }

            info!(%pr, attempt, "refreshing...");
            let info = platform.get_pull_request(current.number).await?;
            if info.mergeable_state.is_computed() {
                state = RefreshState::Fresh;
                info!(%pr, attempt, mergeable_state = %info.mergeable_state, ?state, "refreshed");
                return Ok(Refreshed {
                    info,
                    attempts: attempt,
                });
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    () = cancel.cancelled() => return Err(Error::Cancelled { pr }),
                    () = tokio::time::sleep(self.interval) => {}
                }
            }
        }

        Err(Error::RefreshTimeout {
            pr,
            attempts: self.max_attempts,
        })
    }
}
