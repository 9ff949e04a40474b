use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use vyapari_core_api::domain::AccountId;

use crate::repository::RateWindowStore;

/// Sliding windows held in this process. Correct only for a single worker.
#[derive(Clone, Default)]
pub struct MemoryRateWindowStore {
    windows: Arc<Mutex<HashMap<AccountId, VecDeque<DateTime<Utc>>>>>,
}

impl MemoryRateWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous admission check; the whole check runs under one lock.
    pub fn admit(&self, account_id: &AccountId, now: DateTime<Utc>, window: Duration, max_calls: usize) -> bool {
        let cutoff = TimeDelta::from_std(window)
            .ok()
            .and_then(|w| now.checked_sub_signed(w))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut windows = self.windows.lock();
        let calls = windows.entry(account_id.clone()).or_default();
        while calls.front().is_some_and(|t| *t <= cutoff) {
            calls.pop_front();
        }
        if calls.len() >= max_calls {
            return false;
        }
        calls.push_back(now);
        true
    }
}

#[async_trait]
impl RateWindowStore for MemoryRateWindowStore {
    async fn try_admit(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
        window: Duration,
        max_calls: usize,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.admit(account_id, now, window, max_calls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_after_max_calls_then_recovers() {
        let store = MemoryRateWindowStore::new();
        let account = AccountId::from(1i64);
        let start = Utc.with_ymd_and_hms(2025, 7, 5, 9, 0, 0).unwrap();
        let window = Duration::from_secs(60);

        for second in 0..3 {
            assert!(store.admit(&account, start + TimeDelta::seconds(second), window, 3));
        }
        assert!(!store.admit(&account, start + TimeDelta::seconds(10), window, 3));
        // Rejections are not recorded, so the window frees up 60s after the first call.
        assert!(store.admit(&account, start + TimeDelta::seconds(60), window, 3));
    }

    #[test]
    fn accounts_have_separate_windows() {
        let store = MemoryRateWindowStore::new();
        let now = Utc.with_ymd_and_hms(2025, 7, 5, 9, 0, 0).unwrap();
        let window = Duration::from_secs(60);
        assert!(store.admit(&AccountId::from(1i64), now, window, 1));
        assert!(!store.admit(&AccountId::from(1i64), now, window, 1));
        assert!(store.admit(&AccountId::from(2i64), now, window, 1));
    }
}
