//! Billing document lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a sale's receipt document.
///
/// Legal transitions:
///
/// ```text
/// (new) ──► GENERATING ──► GENERATED          (terminal, success)
///               │
///               └────────► FAILED ──► GENERATING   (retry)
///                             │
///                             └─────► ABANDONED    (terminal, retry budget spent)
/// ```
///
/// A line can never reach GENERATED without passing through GENERATING, and
/// ABANDONED lines are excluded from retry selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingStatus {
    /// Receipt generation is in flight (or queued for its first attempt)
    Generating,
    /// Receipt rendered, persisted and dispatched; durable reference stored
    Generated,
    /// The last generation attempt failed; eligible for retry
    Failed,
    /// Retry budget exhausted; dead-lettered, no further attempts
    Abandoned,
}

impl BillingStatus {
    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition(self, next: BillingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Generating, Self::Generated)
                | (Self::Generating, Self::Failed)
                | (Self::Failed, Self::Generating)
                | (Self::Failed, Self::Abandoned)
        )
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Generated | Self::Abandoned)
    }
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Generating => "GENERATING",
            Self::Generated => "GENERATED",
            Self::Failed => "FAILED",
            Self::Abandoned => "ABANDONED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BillingStatus::*;

    #[test]
    fn only_documented_transitions_are_legal() {
        let all = [Generating, Generated, Failed, Abandoned];
        for from in all {
            for to in all {
                let legal = matches!(
                    (from, to),
                    (Generating, Generated)
                        | (Generating, Failed)
                        | (Failed, Generating)
                        | (Failed, Abandoned)
                );
                assert_eq!(from.can_transition(to), legal, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn generated_is_never_reachable_except_from_generating() {
        for from in [Generated, Failed, Abandoned] {
            assert!(!from.can_transition(Generated));
        }
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Generating).unwrap(),
            "\"GENERATING\""
        );
        let parsed: BillingStatus = serde_json::from_str("\"FAILED\"").unwrap();
        assert_eq!(parsed, Failed);
    }
}
