//! Strongly typed configuration schema.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use refund_lifecycle::SweeperConfig;
use refund_policy::{Policy, PolicyDraft};
use refund_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Top-level desk configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// How often pending reviews are checked for expiry, in milliseconds.
    pub sweep_interval_ms: u64,
    /// Logging setup.
    pub telemetry: TelemetryConfig,
    /// Initial refund policy.
    pub policy: PolicyDraft,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            telemetry: TelemetryConfig::default(),
            policy: PolicyDraft::default(),
        }
    }
}

impl DeskConfig {
    /// Returns the sweeper configuration.
    #[must_use]
    pub fn sweeper(&self) -> SweeperConfig {
        SweeperConfig::new(Duration::from_millis(self.sweep_interval_ms))
    }

    /// Validates the embedded policy and returns it.
    ///
    /// # Errors
    ///
    /// Returns the policy validation error with context.
    pub fn initial_policy(&self) -> Result<Policy> {
        Policy::validate(self.policy.clone()).context("invalid initial refund policy")
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid section.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.sweep_interval_ms > 0,
            "sweep_interval_ms must be greater than zero"
        );
        self.telemetry.env_filter()?;
        self.initial_policy()?;
        Ok(())
    }
}
