//! Shared error definitions for refund primitives.

use thiserror::Error;

/// Result alias used throughout the refund desk.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive refund types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Identifier failed validation.
    #[error("invalid {kind} `{id}`: {reason}")]
    InvalidId {
        /// Which identifier family rejected the value.
        kind: &'static str,
        /// The offending identifier string.
        id: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Amount is outside the accepted range.
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount.
        amount: u64,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// A signed amount was below zero.
    #[error("invalid amount {amount}: amount cannot be negative")]
    NegativeAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// A refund request was missing required data.
    #[error("invalid refund request: {reason}")]
    InvalidRequest {
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}
