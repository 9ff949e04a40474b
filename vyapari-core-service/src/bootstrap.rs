//! Process start-up helpers.

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vyapari_core_api::config::{LedgerConfig, LOG_ENV_VAR};

/// Install the global tracing subscriber.
///
/// The filter comes from `VYAPARI_LOG` (e.g. `vyapari_core_service=debug`),
/// defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load and validate configuration, logging the effective limits.
pub fn load_config(path: Option<&str>) -> anyhow::Result<LedgerConfig> {
    let config = LedgerConfig::load(path).context("failed to load ledger configuration")?;
    tracing::info!(
        max_calls = config.rate_limit.max_calls,
        window_secs = config.rate_limit.window_secs,
        operation_timeout_secs = config.operation_timeout_secs,
        liveness_interval_secs = config.liveness_interval_secs,
        blocking_workers = config.blocking_workers,
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some("/nonexistent/vyapari-test.yaml")).unwrap_err();
        assert!(err.to_string().contains("ledger configuration"));
    }
}
