//! Merge priority scoring and candidate selection
//!
//! Pure decision table over four inputs; no I/O happens here.

use crate::types::{BranchUpdateState, CheckState, MergeableState};

/// Score of a pull request that must not be merged
pub const NOT_ELIGIBLE: i32 = -1;

/// Up to date, CI green, mergeable
pub const SCORE_READY: i32 = 11;

/// Mergeable, or blocked only by CI that is still running on a fresh branch
pub const SCORE_CLEAN: i32 = 10;

/// Behind its base, CI green, branch can be updated
pub const SCORE_BEHIND_GREEN: i32 = 7;

/// Behind its base, CI running, branch can be updated
pub const SCORE_BEHIND_PENDING: i32 = 5;

/// Inputs to the priority decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityInputs {
    /// Approval gate verdict
    pub approved: bool,
    /// Platform mergeable-state
    pub mergeable_state: MergeableState,
    /// CI verdict
    pub ci: CheckState,
    /// Branch freshness
    pub branch_update_state: BranchUpdateState,
}

/// Compute the merge priority; higher is more merge-ready, `-1` is not eligible.
pub const fn score(inputs: PriorityInputs) -> i32 {
    use BranchUpdateState as Branch;
    use CheckState as Ci;
    use MergeableState as Mergeable;

    if !inputs.approved {
        return NOT_ELIGIBLE;
    }

    match (inputs.mergeable_state, inputs.ci, inputs.branch_update_state) {
        (Mergeable::Clean, Ci::Success, Branch::Clean) => SCORE_READY,
        (Mergeable::Clean, _, _) => SCORE_CLEAN,
        // maybe clean soon, or the branch we just updated
        (Mergeable::Blocked, Ci::Pending, Branch::Clean) => SCORE_CLEAN,
        (Mergeable::Behind, Ci::Success, branch) if branch.is_updatable() => SCORE_BEHIND_GREEN,
        (Mergeable::Behind, Ci::Pending, branch) if branch.is_updatable() => SCORE_BEHIND_PENDING,
        _ => NOT_ELIGIBLE,
    }
}

/// Pick the candidate with the strictly highest eligible score.
///
/// Ties keep the first one in `items`, so the caller's ordering decides.
pub fn select_candidate<T, F>(items: &[T], score_of: F) -> Option<&T>
where
    F: Fn(&T) -> i32,
{
    let mut best: Option<(&T, i32)> = None;
    for item in items {
        let s = score_of(item);
        if s == NOT_ELIGIBLE {
            continue;
        }
        if best.is_none_or(|(_, top)| s > top) {
            best = Some((item, s));
        }
    }
    best.map(|(item, _)| item)
}
