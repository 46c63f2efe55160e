//! Required approval count lookup

use crate::config::BotConfig;
use std::collections::HashMap;
use tracing::debug;

/// Required approvals per scope, built once from configuration
///
/// Scope keys are tried in order: `repo@branch`, `repo`, `@branch`,
/// `default`. When none is present the global default applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPolicy {
    scopes: HashMap<String, u32>,
    global_default: u32,
}

impl ApprovalPolicy {
    /// Create a policy from explicit scopes and a global default
    pub const fn new(scopes: HashMap<String, u32>, global_default: u32) -> Self {
        Self {
            scopes,
            global_default,
        }
    }

    /// Build the policy from bot configuration
    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(
            config.required_approvals.clone(),
            config.default_required_approvals,
        )
    }

    /// Required approvals for a repository (`owner/name`) and base branch
    pub fn required_approvals(&self, repo: &str, branch: &str) -> u32 {
        let keys = [
            format!("{repo}@{branch}"),
            repo.to_string(),
            format!("@{branch}"),
            "default".to_string(),
        ];

        for key in &keys {
            if let Some(&required) = self.scopes.get(key) {
                return required;
            }
        }

        debug!(repo, branch, default = self.global_default, "no approval scope matched");
        self.global_default
    }
}
