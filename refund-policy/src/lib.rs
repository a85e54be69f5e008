//! Refund approval policy and decision table.
//!
//! A [`Policy`] is obtained only by validating a [`PolicyDraft`]. The
//! [`decide`] function routes a [`RefundRequest`] through a fixed, first-match
//! [`DECISION_TABLE`] against one policy snapshot.

#![warn(missing_docs, clippy::pedantic)]

pub mod active;
pub mod contracts;
pub mod decision;
pub mod engine;
pub mod error;
pub mod integrations;
pub mod policy;

pub use active::ActivePolicy;
pub use contracts::{RefundRequest, RefundRequestBuilder};
pub use decision::{Decision, DecisionKind, DecisionReason};
pub use engine::{DECISION_TABLE, DecisionRule, decide};
pub use error::{PolicyError, PolicyResult};
pub use integrations::{InMemorySettingsStore, SettingsStore};
pub use policy::{
    ApprovalMode, ExpirationAction, NotificationChannels, NotificationSettings, NotifyTriggers,
    OrderState, Policy, PolicyDraft, RefundType, ReviewTriggers,
};
