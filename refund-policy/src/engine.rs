//! First-match decision table routing refunds to approval, review, or rejection.

use tracing::debug;

use crate::contracts::RefundRequest;
use crate::decision::{Decision, DecisionReason};
use crate::policy::{ApprovalMode, Policy};

/// One row of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionRule {
    /// Reject refund types the policy does not allow.
    DisallowedType,
    /// Route refunds on trigger order states to review.
    OrderStateTrigger,
    /// Route everything to review under manual mode.
    ManualMode,
    /// Approve everything under auto mode.
    AutoMode,
    /// Approve at or below the limit under hybrid mode, review the rest.
    HybridThreshold,
}

/// Decision table rows in evaluation order. The first matching row wins.
pub const DECISION_TABLE: [DecisionRule; 5] = [
    DecisionRule::DisallowedType,
    DecisionRule::OrderStateTrigger,
    DecisionRule::ManualMode,
    DecisionRule::AutoMode,
    DecisionRule::HybridThreshold,
];

impl DecisionRule {
    /// Returns the rule name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DisallowedType => "disallowed-type",
            Self::OrderStateTrigger => "order-state-trigger",
            Self::ManualMode => "manual-mode",
            Self::AutoMode => "auto-mode",
            Self::HybridThreshold => "hybrid-threshold",
        }
    }

    /// Returns the decision for this row, or `None` when the row does not match.
    #[must_use]
    pub fn apply(self, request: &RefundRequest, policy: &Policy) -> Option<Decision> {
        match self {
            Self::DisallowedType => (!policy.allows(request.refund_type()))
                .then_some(Decision::reject(DecisionReason::DisallowedType)),
            Self::OrderStateTrigger => policy
                .review_triggers()
                .forces_review(request.order_state())
                .then_some(Decision::review(DecisionReason::TriggeredByOrderState)),
            Self::ManualMode => (policy.approval_mode() == ApprovalMode::Manual)
                .then_some(Decision::review(DecisionReason::TriggeredByMode)),
            Self::AutoMode => (policy.approval_mode() == ApprovalMode::Auto)
                .then_some(Decision::approve(DecisionReason::TriggeredByMode)),
            Self::HybridThreshold => (policy.approval_mode() == ApprovalMode::Hybrid).then(|| {
                if request.amount() <= policy.auto_approval_limit() {
                    Decision::approve(DecisionReason::BelowAutoLimit)
                } else {
                    Decision::review(DecisionReason::TriggeredByMode)
                }
            }),
        }
    }
}

/// Evaluates a refund request against a policy snapshot.
///
/// Rows of [`DECISION_TABLE`] are tried in order and the first match wins, so a
/// disallowed type is rejected even when a review trigger or auto-approval
/// would otherwise apply. Every approval mode is covered by a row; the trailing
/// review fallback only guards against a table edited out of sync with
/// [`ApprovalMode`].
#[must_use]
pub fn decide(request: &RefundRequest, policy: &Policy) -> Decision {
    for rule in DECISION_TABLE {
        if let Some(decision) = rule.apply(request, policy) {
            debug!(
                refund_id = %request.id(),
                rule = rule.name(),
                decision = ?decision.kind(),
                reason = ?decision.reason(),
                "refund decision rule matched"
            );
            return decision;
        }
    }

    Decision::review(DecisionReason::TriggeredByMode)
}
