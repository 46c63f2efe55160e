//! CI verdict from external commit status checks

use crate::config::BotIdentity;
use crate::types::{CheckState, StatusCheck};
use serde::Serialize;

/// CI verdict for a head commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiStatus {
    /// Combined state of all non-bot checks
    pub state: CheckState,
    /// Link to the check that decided the verdict, if any
    pub target_url: Option<String>,
}

impl CiStatus {
    /// Verdict used when no external check exists yet
    pub const fn no_checks() -> Self {
        Self {
            state: CheckState::Pending,
            target_url: None,
        }
    }
}

/// Combine the non-bot status checks into one verdict.
///
/// Failure beats pending, pending beats success. Without any external check
/// the verdict is `pending`. Checks are expected to be the latest per context.
pub fn resolve_ci_status(statuses: &[StatusCheck], bot: &BotIdentity) -> CiStatus {
    let mut deciding: Option<&StatusCheck> = None;

    for check in statuses.iter().filter(|s| !bot.owns_context(&s.context)) {
        let replace = deciding.is_none_or(|current| rank(check.state) > rank(current.state));
        if replace {
            deciding = Some(check);
        }
    }

    deciding.map_or_else(CiStatus::no_checks, |check| CiStatus {
        state: check.state,
        target_url: check.target_url.clone(),
    })
}

const fn rank(state: CheckState) -> u8 {
    match state {
        CheckState::Success => 0,
        CheckState::Pending => 1,
        CheckState::Failure => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(context: &str, state: CheckState) -> StatusCheck {
        StatusCheck {
            context: context.to_string(),
            state,
            description: None,
            target_url: Some(format!("https://ci.example/{context}")),
        }
    }

    fn bot() -> BotIdentity {
        BotIdentity::new("mergebot")
    }

    #[test]
    fn test_no_checks_is_pending() {
        let ci = resolve_ci_status(&[], &bot());
        assert_eq!(ci, CiStatus::no_checks());
    }

    #[test]
    fn test_only_bot_checks_is_pending() {
        let statuses = vec![check("mergebot/reviewers", CheckState::Success)];
        let ci = resolve_ci_status(&statuses, &bot());
        assert_eq!(ci.state, CheckState::Pending);
        assert_eq!(ci.target_url, None);
    }

    #[test]
    fn test_bot_failure_does_not_fail_ci() {
        let statuses = vec![
            check("mergebot/reviewers", CheckState::Failure),
            check("ci/build", CheckState::Success),
        ];
        assert_eq!(resolve_ci_status(&statuses, &bot()).state, CheckState::Success);
    }

    #[test]
    fn test_failure_wins_regardless_of_order() {
        let statuses = vec![
            check("ci/build", CheckState::Success),
            check("ci/lint", CheckState::Pending),
            check("ci/test", CheckState::Failure),
        ];
        let ci = resolve_ci_status(&statuses, &bot());
        assert_eq!(ci.state, CheckState::Failure);
        assert_eq!(ci.target_url.as_deref(), Some("https://ci.example/ci/test"));

        let reversed: Vec<_> = statuses.into_iter().rev().collect();
        assert_eq!(resolve_ci_status(&reversed, &bot()).state, CheckState::Failure);
    }

    #[test]
    fn test_pending_beats_success() {
        let statuses = vec![
            check("ci/build", CheckState::Success),
            check("ci/lint", CheckState::Pending),
        ];
        assert_eq!(resolve_ci_status(&statuses, &bot()).state, CheckState::Pending);
    }
}
