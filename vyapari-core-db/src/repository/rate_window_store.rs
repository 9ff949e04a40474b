use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vyapari_core_api::domain::AccountId;

/// Backend of the sliding-window rate limiter
///
/// Implementations must serialize checks for the same account so two
/// simultaneous calls cannot both take the last free slot.
#[async_trait]
pub trait RateWindowStore: Send + Sync {
    /// Prune timestamps older than `now - window`, then record `now` and
    /// admit if fewer than `max_calls` remain
    ///
    /// # Returns
    /// * `Ok(true)` - Admitted; `now` was recorded
    /// * `Ok(false)` - Rejected; nothing was recorded
    /// * `Err` - The backend is unavailable
    async fn try_admit(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
        window: Duration,
        max_calls: usize,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
