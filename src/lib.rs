//! mergebot - decision core of an automatic pull request merge bot
//!
//! Turns review events, CI statuses and platform mergeability into an
//! approval verdict and a merge priority, and merges the best candidate with
//! a rebase-then-merge strategy.

pub mod approval;
pub mod auth;
pub mod ci;
pub mod config;
pub mod engine;
pub mod error;
pub mod merge;
pub mod platform;
pub mod priority;
pub mod publish;
pub mod pull;
pub mod refresh;
pub mod types;
