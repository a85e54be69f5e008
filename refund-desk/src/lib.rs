//! Refund approval policy and lifecycle engine facade.
//!
//! Depend on this crate to pull the refund desk components in one place. The
//! policy layer is always available; the lifecycle engine, telemetry, and
//! configuration loader sit behind feature flags.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use refund_primitives as primitives;

/// Policy model, validation, and decision table.
pub use refund_policy as policy;

/// Case lifecycle, case book, and expiration sweeper (enabled by `lifecycle` feature).
#[cfg(feature = "lifecycle")]
pub use refund_lifecycle as lifecycle;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use refund_telemetry as telemetry;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use refund_config as config;
