//! Decision types produced by the refund decision table.

use serde::{Deserialize, Serialize};

/// Describes the outcome of evaluating a refund against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Refund is approved without a reviewer.
    Approve,
    /// Refund must wait for a reviewer.
    Review,
    /// Refund is rejected outright.
    Reject,
}

/// Why a refund reached its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Hybrid mode and the amount is at or below the auto-approval limit.
    BelowAutoLimit,
    /// The order state is configured as a manual review trigger.
    TriggeredByOrderState,
    /// The approval mode alone decided the outcome.
    TriggeredByMode,
    /// The refund type is not allowed by the policy.
    DisallowedType,
    /// The review window elapsed without a resolution.
    TimedOut,
    /// A reviewer approved or rejected the refund.
    ResolvedByReviewer,
    /// The requester withdrew the refund while it awaited review.
    WithdrawnByRequester,
}

/// Structured decision emitted by the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    kind: DecisionKind,
    reason: DecisionReason,
}

impl Decision {
    /// Returns an approve decision.
    #[must_use]
    pub const fn approve(reason: DecisionReason) -> Self {
        Self {
            kind: DecisionKind::Approve,
            reason,
        }
    }

    /// Returns a review decision.
    #[must_use]
    pub const fn review(reason: DecisionReason) -> Self {
        Self {
            kind: DecisionKind::Review,
            reason,
        }
    }

    /// Returns a reject decision.
    #[must_use]
    pub const fn reject(reason: DecisionReason) -> Self {
        Self {
            kind: DecisionKind::Reject,
            reason,
        }
    }

    /// Returns the decision kind.
    #[must_use]
    pub const fn kind(self) -> DecisionKind {
        self.kind
    }

    /// Returns the reason attached to the decision.
    #[must_use]
    pub const fn reason(self) -> DecisionReason {
        self.reason
    }

    /// Returns true when the refund may proceed without review.
    #[must_use]
    pub const fn is_approve(self) -> bool {
        matches!(self.kind, DecisionKind::Approve)
    }

    /// Returns true when the refund needs a reviewer.
    #[must_use]
    pub const fn is_review(self) -> bool {
        matches!(self.kind, DecisionKind::Review)
    }

    /// Returns true when the refund is rejected.
    #[must_use]
    pub const fn is_reject(self) -> bool {
        matches!(self.kind, DecisionKind::Reject)
    }
}
