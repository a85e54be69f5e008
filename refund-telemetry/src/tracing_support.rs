//! Structured tracing setup.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable read by the config loader to override [`TelemetryConfig::filter`].
pub const LOG_ENV: &str = "REFUND_DESK_LOG";

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive, e.g. `info` or `refund_lifecycle=debug`.
    pub filter: String,
    /// Include the event target in each line.
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            with_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Creates a configuration with the given filter directive.
    #[must_use]
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    /// Parses the configured directive.
    ///
    /// # Errors
    ///
    /// Returns an error when the directive does not parse.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.filter)
            .with_context(|| format!("invalid log filter `{}`", self.filter))
    }
}

/// Installs a global `fmt` subscriber.
///
/// # Errors
///
/// Returns an error when the filter is invalid or a global subscriber is
/// already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let filter = config.env_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_level(true)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install tracing subscriber")?;
    debug!(filter = %config.filter, "tracing subscriber installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(TelemetryConfig::default().env_filter().is_ok());
    }

    #[test]
    fn invalid_directive_rejected() {
        let err = TelemetryConfig::with_filter("refund_lifecycle=loud")
            .env_filter()
            .unwrap_err();
        assert!(err.to_string().contains("refund_lifecycle=loud"));
    }

    #[test]
    fn second_install_fails() {
        let config = TelemetryConfig::with_filter("refund_lifecycle=debug");
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
