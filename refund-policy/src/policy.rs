//! Refund approval policy: the editable draft and its validated form.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::TimeDelta;
use refund_primitives::Amount;
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// How incoming refunds are routed when no review trigger applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Every allowed refund is approved automatically.
    Auto,
    /// Every allowed refund waits for a reviewer.
    Manual,
    /// Refunds at or below the auto-approval limit are approved, the rest reviewed.
    Hybrid,
}

/// Whether a refund covers the whole order or part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundType {
    /// Whole-order refund.
    Full,
    /// Refund of selected items or a partial amount.
    Partial,
}

/// State of the order at the time the refund was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Order placed, not yet confirmed by the merchant.
    Placed,
    /// Merchant accepted the order.
    Confirmed,
    /// Kitchen or warehouse is working on the order.
    InPreparation,
    /// Order delivered or collected.
    Completed,
    /// Order cancelled.
    Cancelled,
}

/// Fallback applied when a pending review outlives its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationAction {
    /// Hand the refund to the platform's support team.
    EscalateToPlatform,
    /// Approve the refund without a reviewer.
    AutoApprove,
}

/// Conditions that force manual review irrespective of mode and amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTriggers {
    /// Order states that always require a reviewer.
    #[serde(default)]
    pub order_states: BTreeSet<OrderState>,
}

impl ReviewTriggers {
    /// Returns `true` when `state` forces manual review.
    #[must_use]
    pub fn forces_review(&self, state: OrderState) -> bool {
        self.order_states.contains(&state)
    }
}

/// Channels a reviewer may be notified through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannels {
    /// In-app notification.
    pub app: bool,
    /// Email notification.
    pub email: bool,
}

impl NotificationChannels {
    /// Returns `true` when at least one channel is enabled.
    #[must_use]
    pub const fn any(self) -> bool {
        self.app || self.email
    }
}

/// Events that should produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyTriggers {
    /// A refund entered manual review.
    pub review_needed: bool,
    /// A pending review is about to expire.
    pub expiring: bool,
}

/// Notification preferences attached to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Enabled delivery channels.
    pub channels: NotificationChannels,
    /// Enabled notification triggers.
    pub triggers: NotifyTriggers,
    /// Minutes before the review deadline at which the expiry reminder is due.
    pub reminder_minutes: u32,
}

impl NotificationSettings {
    /// Lead time before a deadline at which the expiry reminder becomes due.
    #[must_use]
    pub fn reminder_lead(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.reminder_minutes))
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            channels: NotificationChannels {
                app: true,
                email: false,
            },
            triggers: NotifyTriggers {
                review_needed: true,
                expiring: true,
            },
            reminder_minutes: 5,
        }
    }
}

/// Editable, unvalidated policy as it arrives from a settings form.
///
/// Numeric fields are signed so that out-of-range input can be reported as a
/// [`PolicyError`] instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDraft {
    /// Routing mode.
    pub approval_mode: ApprovalMode,
    /// Hybrid-mode ceiling for automatic approval.
    pub auto_approval_limit: i64,
    /// Refund types the merchant accepts.
    pub allowed_types: BTreeSet<RefundType>,
    /// Manual review triggers.
    #[serde(default)]
    pub review_triggers: ReviewTriggers,
    /// Review window in minutes.
    pub review_time_limit_minutes: i64,
    /// Fallback when the review window elapses.
    pub expiration_action: ExpirationAction,
    /// Notification preferences.
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Default for PolicyDraft {
    fn default() -> Self {
        Self {
            approval_mode: ApprovalMode::Hybrid,
            auto_approval_limit: 200,
            allowed_types: BTreeSet::from([RefundType::Full]),
            review_triggers: ReviewTriggers {
                order_states: BTreeSet::from([OrderState::Completed, OrderState::Cancelled]),
            },
            review_time_limit_minutes: 30,
            expiration_action: ExpirationAction::EscalateToPlatform,
            notifications: NotificationSettings::default(),
        }
    }
}

/// Validated refund approval policy.
///
/// A `Policy` can only be obtained through [`Policy::validate`], so every
/// instance satisfies its invariants. Changing a policy means validating a new
/// draft; existing values are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDraft", into = "PolicyDraft")]
pub struct Policy {
    approval_mode: ApprovalMode,
    auto_approval_limit: Amount,
    allowed_types: BTreeSet<RefundType>,
    review_triggers: ReviewTriggers,
    review_time_limit: NonZeroU32,
    expiration_action: ExpirationAction,
    notifications: NotificationSettings,
}

impl Policy {
    /// Validates a draft into a policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyAllowedTypes`] when no refund type is allowed,
    /// and [`PolicyError::InvalidThreshold`] when the auto-approval limit is
    /// negative or the review window is not a positive number of minutes.
    pub fn validate(draft: PolicyDraft) -> PolicyResult<Self> {
        if draft.allowed_types.is_empty() {
            return Err(PolicyError::EmptyAllowedTypes);
        }

        let auto_approval_limit = Amount::try_from(draft.auto_approval_limit).map_err(|_| {
            PolicyError::InvalidThreshold("auto-approval limit cannot be negative")
        })?;

        let review_time_limit = u32::try_from(draft.review_time_limit_minutes)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(PolicyError::InvalidThreshold(
                "review time limit must be a positive number of minutes",
            ))?;

        Ok(Self {
            approval_mode: draft.approval_mode,
            auto_approval_limit,
            allowed_types: draft.allowed_types,
            review_triggers: draft.review_triggers,
            review_time_limit,
            expiration_action: draft.expiration_action,
            notifications: draft.notifications,
        })
    }

    /// Returns the editable form of this policy.
    #[must_use]
    pub fn to_draft(&self) -> PolicyDraft {
        PolicyDraft {
            approval_mode: self.approval_mode,
            auto_approval_limit: i64::try_from(self.auto_approval_limit.get()).unwrap_or(i64::MAX),
            allowed_types: self.allowed_types.clone(),
            review_triggers: self.review_triggers.clone(),
            review_time_limit_minutes: i64::from(self.review_time_limit.get()),
            expiration_action: self.expiration_action,
            notifications: self.notifications,
        }
    }

    /// Returns the routing mode.
    #[must_use]
    pub const fn approval_mode(&self) -> ApprovalMode {
        self.approval_mode
    }

    /// Returns the Hybrid-mode auto-approval ceiling (inclusive).
    #[must_use]
    pub const fn auto_approval_limit(&self) -> Amount {
        self.auto_approval_limit
    }

    /// Returns the allowed refund types; never empty.
    #[must_use]
    pub fn allowed_types(&self) -> &BTreeSet<RefundType> {
        &self.allowed_types
    }

    /// Returns `true` when `refund_type` is accepted.
    #[must_use]
    pub fn allows(&self, refund_type: RefundType) -> bool {
        self.allowed_types.contains(&refund_type)
    }

    /// Returns the manual review triggers.
    #[must_use]
    pub fn review_triggers(&self) -> &ReviewTriggers {
        &self.review_triggers
    }

    /// Returns the review window in minutes.
    #[must_use]
    pub const fn review_time_limit_minutes(&self) -> NonZeroU32 {
        self.review_time_limit
    }

    /// Returns the review window as a duration.
    #[must_use]
    pub fn review_window(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.review_time_limit.get()))
    }

    /// Returns the fallback applied to expired reviews.
    #[must_use]
    pub const fn expiration_action(&self) -> ExpirationAction {
        self.expiration_action
    }

    /// Returns the notification preferences.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationSettings {
        &self.notifications
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::validate(PolicyDraft::default()).expect("default policy is valid")
    }
}

impl TryFrom<PolicyDraft> for Policy {
    type Error = PolicyError;

    fn try_from(draft: PolicyDraft) -> PolicyResult<Self> {
        Self::validate(draft)
    }
}

impl From<Policy> for PolicyDraft {
    fn from(policy: Policy) -> Self {
        policy.to_draft()
    }
}
