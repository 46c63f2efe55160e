//! Approval gate

use super::Approvals;

/// Whether a pull request is approved.
///
/// Needs at least `required` approvals and no outstanding change request;
/// a single change request vetoes regardless of the approval count.
pub fn is_approved(approvals: &Approvals, required: u32) -> bool {
    approvals.changes_requested.is_empty() && approvals.approved_count() >= required as usize
}
