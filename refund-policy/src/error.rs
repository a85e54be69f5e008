//! Errors surfaced by policy validation and settings persistence.

use thiserror::Error;

/// Errors surfaced by policy operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A policy must allow at least one refund type.
    #[error("policy must allow at least one refund type")]
    EmptyAllowedTypes,
    /// A numeric threshold was out of range.
    #[error("invalid policy threshold: {0}")]
    InvalidThreshold(&'static str),
    /// Settings backend returned an error.
    #[error("settings backend failure: {reason}")]
    Backend {
        /// Human-readable explanation for logging and operators.
        reason: String,
    },
}

impl PolicyError {
    /// Convenience helper to construct backend errors.
    #[must_use]
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Result alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
