//! Folding review events into approval sets

use crate::types::{ReviewEvent, ReviewVerdict};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;
use tracing::error;

/// Logins that currently approve or request changes
///
/// The two sets never share a login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Approvals {
    /// Reviewers whose latest verdict is an approval
    pub approved: BTreeSet<String>,
    /// Reviewers whose latest verdict is a change request
    pub changes_requested: BTreeSet<String>,
}

impl Approvals {
    /// Number of approving reviewers
    pub fn approved_count(&self) -> usize {
        self.approved.len()
    }

    /// Number of reviewers requesting changes
    pub fn changes_requested_count(&self) -> usize {
        self.changes_requested.len()
    }
}

/// Replay review events in order, keeping the last verdict per reviewer.
///
/// Events from users outside `collaborators` are skipped. A dismissal only
/// revokes an approval. Unrecognized verdicts are logged and ignored.
pub fn reconcile_reviews<S: BuildHasher>(
    reviews: &[ReviewEvent],
    collaborators: &HashSet<u64, S>,
) -> Approvals {
    let mut ordered: Vec<&ReviewEvent> = reviews.iter().collect();
    ordered.sort_by_key(|r| r.position);

    let mut approvals = Approvals::default();
    for review in ordered {
        if !collaborators.contains(&review.user_id) {
            continue;
        }

        let login = &review.login;
        match &review.verdict {
            ReviewVerdict::Approved => {
                approvals.changes_requested.remove(login);
                approvals.approved.insert(login.clone());
            }
            ReviewVerdict::ChangesRequested => {
                approvals.approved.remove(login);
                approvals.changes_requested.insert(login.clone());
            }
            ReviewVerdict::Dismissed => {
                approvals.approved.remove(login);
            }
            ReviewVerdict::Commented => {}
            ReviewVerdict::Other(state) => {
                error!(login = %login, state = %state, "review state unhandled");
            }
        }
    }
    approvals
}
