//! Lifecycle state machine for refund cases.

use chrono::{DateTime, TimeDelta, Utc};
use refund_policy::{
    DecisionKind, DecisionReason, ExpirationAction, Policy, RefundRequest, decide,
};
use refund_primitives::{ActorId, RefundId};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// States a refund case can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundState {
    /// Request received but not yet evaluated.
    New,
    /// Waiting for a reviewer before the deadline.
    PendingReview,
    /// Refund approved.
    Approved,
    /// Refund rejected.
    Rejected,
    /// Review window elapsed and the refund was handed to the platform.
    EscalatedToPlatform,
    /// Requester withdrew the refund while it awaited review.
    Withdrawn,
}

impl RefundState {
    /// Returns `true` while the case awaits a reviewer.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::PendingReview)
    }

    /// Returns `true` once no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::EscalatedToPlatform | Self::Withdrawn
        )
    }
}

/// Reviewer verdict on a pending refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Approve the refund.
    Approve,
    /// Reject the refund.
    Reject,
}

/// Events that trigger lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Initial routing by the decision table.
    Decided(DecisionKind),
    /// A reviewer resolved the case.
    Resolved(ReviewAction),
    /// The review deadline passed.
    Expired(ExpirationAction),
    /// The requester withdrew the refund.
    Withdrawn,
}

/// Returns the state reached by applying `event` in `from`, or `None` when the
/// transition is not permitted.
#[must_use]
pub const fn next_state(from: RefundState, event: LifecycleEvent) -> Option<RefundState> {
    match (from, event) {
        (RefundState::New, LifecycleEvent::Decided(DecisionKind::Approve))
        | (
            RefundState::PendingReview,
            LifecycleEvent::Resolved(ReviewAction::Approve)
            | LifecycleEvent::Expired(ExpirationAction::AutoApprove),
        ) => Some(RefundState::Approved),
        (RefundState::New, LifecycleEvent::Decided(DecisionKind::Reject))
        | (RefundState::PendingReview, LifecycleEvent::Resolved(ReviewAction::Reject)) => {
            Some(RefundState::Rejected)
        }
        (RefundState::New, LifecycleEvent::Decided(DecisionKind::Review)) => {
            Some(RefundState::PendingReview)
        }
        (RefundState::PendingReview, LifecycleEvent::Expired(ExpirationAction::EscalateToPlatform)) => {
            Some(RefundState::EscalatedToPlatform)
        }
        (RefundState::PendingReview, LifecycleEvent::Withdrawn) => Some(RefundState::Withdrawn),
        _ => None,
    }
}

/// Engine-owned record of a refund request and its progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundCase {
    request: RefundRequest,
    state: RefundState,
    decision_reason: DecisionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_by: Option<ActorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_at: Option<DateTime<Utc>>,
    expiration_action: ExpirationAction,
    updated_at: DateTime<Utc>,
}

impl RefundCase {
    /// Returns the underlying request.
    #[must_use]
    pub fn request(&self) -> &RefundRequest {
        &self.request
    }

    /// Returns the refund identifier.
    #[must_use]
    pub fn id(&self) -> &RefundId {
        self.request.id()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> RefundState {
        self.state
    }

    /// Returns why the current state was reached.
    #[must_use]
    pub const fn decision_reason(&self) -> DecisionReason {
        self.decision_reason
    }

    /// Returns the review deadline; present only while pending.
    #[must_use]
    pub const fn review_deadline(&self) -> Option<DateTime<Utc>> {
        self.review_deadline
    }

    /// Returns who resolved or withdrew the case.
    #[must_use]
    pub fn resolved_by(&self) -> Option<&ActorId> {
        self.resolved_by.as_ref()
    }

    /// Returns when a person resolved or withdrew the case.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns the fallback captured from the policy at evaluation time.
    #[must_use]
    pub const fn expiration_action(&self) -> ExpirationAction {
        self.expiration_action
    }

    /// Returns when the case last changed state.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the time left before the review deadline, clamped at zero.
    /// `None` when the case is not pending.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.review_deadline
            .map(|deadline| (deadline - now).max(TimeDelta::zero()))
    }

    /// Returns `true` when the case is pending and its deadline has been reached.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.state.is_pending() && self.review_deadline.is_some_and(|deadline| now >= deadline)
    }

    fn transition(
        &self,
        event: LifecycleEvent,
        reason: DecisionReason,
        actor: Option<ActorId>,
        now: DateTime<Utc>,
    ) -> LifecycleResult<Self> {
        let Some(next) = next_state(self.state, event) else {
            return Err(LifecycleError::InvalidTransition {
                refund_id: self.id().clone(),
                from: self.state,
                event,
            });
        };

        debug!(
            refund_id = %self.id(),
            from = ?self.state,
            to = ?next,
            ?event,
            ?reason,
            "refund lifecycle transition"
        );

        let mut case = self.clone();
        case.state = next;
        case.decision_reason = reason;
        case.review_deadline = None;
        case.updated_at = now;
        if let Some(actor) = actor {
            case.resolved_by = Some(actor);
            case.resolved_at = Some(now);
        }
        Ok(case)
    }
}

/// Evaluates a request against one policy snapshot and returns the new case.
///
/// Cases routed to review carry a deadline of `now` plus the policy's review
/// window, saturating at the latest representable instant. The policy's expiration action is captured so later policy edits do
/// not affect this case.
#[must_use]
pub fn evaluate(request: RefundRequest, policy: &Policy, now: DateTime<Utc>) -> RefundCase {
    let decision = decide(&request, policy);
    let state = match decision.kind() {
        DecisionKind::Approve => RefundState::Approved,
        DecisionKind::Review => RefundState::PendingReview,
        DecisionKind::Reject => RefundState::Rejected,
    };
    debug_assert_eq!(
        next_state(RefundState::New, LifecycleEvent::Decided(decision.kind())),
        Some(state)
    );

    let review_deadline = state.is_pending().then(|| {
        now.checked_add_signed(policy.review_window())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    });

    debug!(
        refund_id = %request.id(),
        amount = %request.amount(),
        ?state,
        reason = ?decision.reason(),
        ?review_deadline,
        "refund evaluated"
    );

    RefundCase {
        request,
        state,
        decision_reason: decision.reason(),
        review_deadline,
        resolved_by: None,
        resolved_at: None,
        expiration_action: policy.expiration_action(),
        updated_at: now,
    }
}

/// Applies a reviewer's verdict to a pending case.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidTransition`] when the case is not pending;
/// the supplied case is never modified.
pub fn resolve(
    case: &RefundCase,
    action: ReviewAction,
    reviewer: ActorId,
    now: DateTime<Utc>,
) -> LifecycleResult<RefundCase> {
    case.transition(
        LifecycleEvent::Resolved(action),
        DecisionReason::ResolvedByReviewer,
        Some(reviewer),
        now,
    )
}

/// Applies the captured expiration action when the review deadline has passed.
///
/// Returns `None` when the case is not pending or its deadline lies in the future.
#[must_use]
pub fn check_expiration(case: &RefundCase, now: DateTime<Utc>) -> Option<RefundCase> {
    if !case.is_expired_at(now) {
        return None;
    }

    case.transition(
        LifecycleEvent::Expired(case.expiration_action),
        DecisionReason::TimedOut,
        None,
        now,
    )
    .ok()
}

/// Withdraws a pending case on behalf of the requester.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidTransition`] when the case is not pending.
pub fn withdraw(
    case: &RefundCase,
    requester: ActorId,
    now: DateTime<Utc>,
) -> LifecycleResult<RefundCase> {
    case.transition(
        LifecycleEvent::Withdrawn,
        DecisionReason::WithdrawnByRequester,
        Some(requester),
        now,
    )
}

/// Errors emitted by lifecycle transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Transition was not permitted from the current state.
    #[error("invalid refund transition from {from:?} via {event:?} for refund {refund_id}")]
    InvalidTransition {
        /// Refund whose transition failed.
        refund_id: RefundId,
        /// State prior to the attempted transition.
        from: RefundState,
        /// Event that was rejected.
        event: LifecycleEvent,
    },
}

/// Result alias used for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
