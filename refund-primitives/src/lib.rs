//! Core shared types for the refund desk.

#![warn(missing_docs, clippy::pedantic)]

mod amount;
mod error;
mod ids;

/// Monetary amount in the merchant's smallest currency unit.
pub use amount::Amount;
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifiers for refunds, orders, and the people acting on them.
pub use ids::{ActorId, OrderId, RefundId};
