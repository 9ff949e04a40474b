use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use vyapari_core_api::config::RateLimitConfig;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::memory::MemoryRateWindowStore;
use vyapari_core_db::repository::RateWindowStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Admitted,
    Rejected,
    /// No account id on the request; never limited.
    PassThrough,
}

impl RateDecision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, RateDecision::Rejected)
    }
}

// ---------------------------------------------------------------------------
// RateLimiter
// ---------------------------------------------------------------------------

/// Sliding-window limiter with an optional shared backend.
///
/// With a shared backend every worker sees the same windows. When that
/// backend errors the check falls back to this process's local windows
/// instead of rejecting traffic.
pub struct RateLimiter {
    shared: Option<Arc<dyn RateWindowStore>>,
    local: MemoryRateWindowStore,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Limiter that only knows about this process.
    pub fn local(config: RateLimitConfig) -> Self {
        Self {
            shared: None,
            local: MemoryRateWindowStore::new(),
            config,
        }
    }

    pub fn shared(store: Arc<dyn RateWindowStore>, config: RateLimitConfig) -> Self {
        Self {
            shared: Some(store),
            local: MemoryRateWindowStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and, if admitted, record one call.
    pub async fn check(&self, account_id: Option<&AccountId>) -> RateDecision {
        let Some(account_id) = account_id else {
            return RateDecision::PassThrough;
        };
        let now = Utc::now();
        let window = self.config.window();
        let max_calls = self.config.max_calls;

        let admitted = match &self.shared {
            Some(shared) => match shared.try_admit(account_id, now, window, max_calls).await {
                Ok(admitted) => admitted,
                Err(e) => {
                    warn!(account_id = %account_id, error = %e, "shared rate window unavailable, using local window");
                    self.local.admit(account_id, now, window, max_calls)
                }
            },
            None => self.local.admit(account_id, now, window, max_calls),
        };

        if admitted {
            RateDecision::Admitted
        } else {
            warn!(account_id = %account_id, max_calls, window_secs = self.config.window_secs, "rate limit exceeded");
            RateDecision::Rejected
        }
    }
}
