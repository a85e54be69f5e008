//! Configuration loader: JSON file plus environment overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::schema::DeskConfig;

/// Overrides [`DeskConfig::sweep_interval_ms`].
pub const ENV_SWEEP_INTERVAL_MS: &str = "REFUND_DESK_SWEEP_INTERVAL_MS";
/// Overrides the telemetry filter directive.
pub use refund_telemetry::tracing_support::LOG_ENV as ENV_LOG;

/// Parses and validates a JSON document. Missing sections take their defaults.
///
/// # Errors
///
/// Returns an error when the document does not parse or fails validation.
pub fn load_from_str(document: &str) -> Result<DeskConfig> {
    let config: DeskConfig =
        serde_json::from_str(document).context("failed to parse refund desk config")?;
    config.validate()?;
    Ok(config)
}

/// Reads a JSON config file, applies environment overrides, and validates.
///
/// # Errors
///
/// Returns an error when the file cannot be read, does not parse, carries an
/// unparsable override, or fails validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<DeskConfig> {
    let path = path.as_ref();
    let document = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut config: DeskConfig = serde_json::from_str(&document)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    debug!(path = %path.display(), "loaded refund desk config");
    Ok(config)
}

/// Applies overrides looked up through `lookup`, usually `std::env::var`.
///
/// # Errors
///
/// Returns an error when an override value cannot be parsed.
pub fn apply_env<F>(config: &mut DeskConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_SWEEP_INTERVAL_MS) {
        config.sweep_interval_ms = raw
            .trim()
            .parse()
            .with_context(|| format!("{ENV_SWEEP_INTERVAL_MS} must be an integer, got `{raw}`"))?;
    }
    if let Some(filter) = lookup(ENV_LOG) {
        config.telemetry.filter = filter;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use refund_policy::{ApprovalMode, ExpirationAction, OrderState, RefundType};

    use super::*;

    const SAMPLE: &str = r#"{
        "sweep_interval_ms": 250,
        "policy": {
            "approval_mode": "manual",
            "auto_approval_limit": 0,
            "allowed_types": ["full", "partial"],
            "review_triggers": { "order_states": ["in_preparation"] },
            "review_time_limit_minutes": 15,
            "expiration_action": "auto_approve"
        }
    }"#;

    #[test]
    fn parses_sample_document() {
        let config = load_from_str(SAMPLE).unwrap();
        assert_eq!(config.sweep_interval_ms, 250);

        let policy = config.initial_policy().unwrap();
        assert_eq!(policy.approval_mode(), ApprovalMode::Manual);
        assert!(policy.allows(RefundType::Partial));
        assert!(policy.review_triggers().forces_review(OrderState::InPreparation));
        assert_eq!(policy.expiration_action(), ExpirationAction::AutoApprove);
        assert_eq!(config.telemetry.filter, "info");
    }

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(load_from_str("{}").unwrap(), DeskConfig::default());
    }

    #[test]
    fn invalid_policy_fails_to_load() {
        let document = SAMPLE.replace("15", "0");
        assert!(load_from_str(&document).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let vars = HashMap::from([
            (ENV_SWEEP_INTERVAL_MS, "50".to_owned()),
            (ENV_LOG, "refund_lifecycle=debug".to_owned()),
        ]);
        let mut config = DeskConfig::default();
        apply_env(&mut config, |key| vars.get(key).cloned()).unwrap();
        assert_eq!(config.sweep_interval_ms, 50);
        assert_eq!(config.telemetry.filter, "refund_lifecycle=debug");
    }

    #[test]
    fn invalid_log_override_fails_validation() {
        let vars = HashMap::from([(ENV_LOG, "refund_lifecycle=loud".to_owned())]);
        let mut config = DeskConfig::default();
        apply_env(&mut config, |key| vars.get(key).cloned()).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_env_override_is_reported() {
        let mut config = DeskConfig::default();
        let err = apply_env(&mut config, |key| {
            (key == ENV_SWEEP_INTERVAL_MS).then(|| "soon".to_owned())
        })
        .unwrap_err();
        assert!(err.to_string().contains(ENV_SWEEP_INTERVAL_MS));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("refund-desk-{}.json", std::process::id()));
        fs::File::create(&path)
            .unwrap()
            .write_all(SAMPLE.as_bytes())
            .unwrap();
        let config = load_from_path(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.initial_policy().unwrap().review_time_limit_minutes().get(), 15);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_from_path("/nonexistent/refund-desk.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
