//! Runtime configuration.
//!
//! Loaded from an optional `vyapari.yaml` file and `VYAPARI__*` environment
//! variables, e.g. `VYAPARI__RATE_LIMIT__MAX_CALLS=20`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Default configuration file name (without extension).
pub const DEFAULT_CONFIG_FILE: &str = "vyapari";
/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "VYAPARI_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "VYAPARI";
/// Environment variable for the tracing filter.
pub const LOG_ENV_VAR: &str = "VYAPARI_LOG";

pub const DEFAULT_MAX_CALLS: usize = 10;
pub const DEFAULT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_MESSAGE_LOG_DEPTH: usize = 5;
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LIVENESS_INTERVAL_SECS: u64 = 4;
pub const DEFAULT_BLOCKING_WORKERS: usize = 10;
pub const DEFAULT_RECENT_DATES_LIMIT: usize = 10;
pub const DEFAULT_WIZARD_SESSION_TTL_SECS: u64 = 900;
pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admissions allowed inside one window.
    pub max_calls: usize,
    /// Trailing window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub rate_limit: RateLimitConfig,
    /// Messages retained per account for context assembly.
    pub message_log_depth: usize,
    /// Hard ceiling for offloaded operations.
    pub operation_timeout_secs: u64,
    /// Period of the "working…" signal while an operation runs.
    pub liveness_interval_secs: u64,
    /// Size of the pool running synchronous storage and rendering calls.
    pub blocking_workers: usize,
    /// Dates listed by the deletion wizard's Recent branch.
    pub recent_dates_limit: usize,
    /// Idle lifetime of a deletion wizard session.
    pub wizard_session_ttl_secs: u64,
    /// Currency code written to ledger rows.
    pub currency: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            message_log_depth: DEFAULT_MESSAGE_LOG_DEPTH,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            liveness_interval_secs: DEFAULT_LIVENESS_INTERVAL_SECS,
            blocking_workers: DEFAULT_BLOCKING_WORKERS,
            recent_dates_limit: DEFAULT_RECENT_DATES_LIMIT,
            wizard_session_ttl_secs: DEFAULT_WIZARD_SESSION_TTL_SECS,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from file and environment, then validate it.
    pub fn load(path: Option<&str>) -> ApiResult<Self> {
        use ::config::{Config, Environment, File, FileFormat};

        let mut builder =
            Config::builder().add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let loaded: LedgerConfig = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ApiError::InternalError(format!("invalid configuration: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.rate_limit.max_calls == 0 {
            return Err(ApiError::InternalError("rate_limit.max_calls must be at least 1".into()));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ApiError::InternalError("rate_limit.window_secs must be at least 1".into()));
        }
        if self.message_log_depth == 0 {
            return Err(ApiError::InternalError("message_log_depth must be at least 1".into()));
        }
        if self.blocking_workers == 0 {
            return Err(ApiError::InternalError("blocking_workers must be at least 1".into()));
        }
        if self.operation_timeout_secs <= self.liveness_interval_secs {
            return Err(ApiError::InternalError(format!(
                "operation_timeout_secs ({}) must exceed liveness_interval_secs ({})",
                self.operation_timeout_secs, self.liveness_interval_secs
            )));
        }
        Ok(())
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }

    pub fn wizard_session_ttl(&self) -> Duration {
        Duration::from_secs(self.wizard_session_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.message_log_depth, 5);
        assert_eq!(config.rate_limit.max_calls, 10);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(60));
    }

    #[test]
    fn timeout_must_exceed_liveness_interval() {
        let config = LedgerConfig {
            operation_timeout_secs: 4,
            liveness_interval_secs: 4,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = LedgerConfig {
            rate_limit: RateLimitConfig {
                max_calls: 5,
                window_secs: 0,
            },
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
