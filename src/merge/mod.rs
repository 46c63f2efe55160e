//! Merge orchestration
//!
//! Two-phase pattern:
//! 1. Strategy - decide what to do after each platform answer (pure, testable)
//! 2. Execute - perform the merge attempts (effectful)

mod execute;
mod strategy;

pub use execute::merge_with_fallback;
pub use strategy::{
    FALLBACK_METHOD, NextStep, PRIMARY_METHOD, REBASE_REFUSED, is_rebase_refusal,
    next_step,
};
