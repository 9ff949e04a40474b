use std::time::Duration;

use moka::future::Cache;
use vyapari_core_api::domain::AccountId;

use super::state::DeletionSession;

const MAX_SESSIONS: u64 = 100_000;

/// Deletion sessions keyed by account. Sessions idle longer than the TTL
/// expire, which ends an abandoned flow.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<AccountId, DeletionSession>,
}

impl SessionStore {
    pub fn new(time_to_idle: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(time_to_idle)
                .build(),
        }
    }

    pub async fn get(&self, account_id: &AccountId) -> Option<DeletionSession> {
        self.cache.get(account_id).await
    }

    pub async fn put(&self, account_id: &AccountId, session: DeletionSession) {
        self.cache.insert(account_id.clone(), session).await;
    }

    pub async fn clear(&self, account_id: &AccountId) {
        self.cache.invalidate(account_id).await;
    }
}
