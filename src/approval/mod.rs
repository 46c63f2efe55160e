//! Review approval: reconciliation, policy lookup and the approval gate
//!
//! All functions here are pure. Reviews and collaborators are fetched by the
//! caller; the policy is built once from configuration and shared read-only.

mod gate;
mod policy;
mod reconcile;

pub use gate::is_approved;
pub use policy::ApprovalPolicy;
pub use reconcile::{Approvals, reconcile_reviews};
