//! Merge strategy selection - pure functions, no I/O

use crate::types::{MergeAttempt, MergeMethod};

/// Strategy tried first
pub const PRIMARY_METHOD: MergeMethod = MergeMethod::Rebase;

/// Strategy tried when the platform refuses to rebase
pub const FALLBACK_METHOD: MergeMethod = MergeMethod::Merge;

/// Message GitHub returns when a rebase merge is impossible
pub const REBASE_REFUSED: &str = "This branch can't be rebased";

/// What to do after a merge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Merged; nothing left to do
    Done,
    /// Try again with another method
    Retry(MergeMethod),
    /// Give up and report the refusal
    Fail,
}

/// Whether a refusal message means "rebase impossible, plain merge may work"
pub fn is_rebase_refusal(message: &str) -> bool {
    message
        .trim()
        .trim_end_matches('.')
        .eq_ignore_ascii_case(REBASE_REFUSED)
}

/// Decide the next step after attempting `method`.
///
/// Only a rebase refusal on the primary method leads to a retry; every other
/// refusal, and any refusal of the fallback, is final.
pub fn next_step(method: MergeMethod, attempt: &MergeAttempt) -> NextStep {
    match attempt {
        MergeAttempt::Merged { .. } => NextStep::Done,
        MergeAttempt::Rejected { message, .. }
            if method == PRIMARY_METHOD && is_rebase_refusal(message) =>
        {
            NextStep::Retry(FALLBACK_METHOD)
        }
        MergeAttempt::Rejected { .. } => NextStep::Fail,
    }
}
