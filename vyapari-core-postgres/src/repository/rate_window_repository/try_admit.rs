use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::error::Error;
use std::time::Duration;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::repository::RateWindowStore;

use super::repo_impl::RateWindowRepositoryImpl;
use crate::utils::hash_as_i64;

impl RateWindowRepositoryImpl {
    pub(super) async fn try_admit_impl(
        repo: &RateWindowRepositoryImpl,
        account_id: &AccountId,
        now: DateTime<Utc>,
        window: Duration,
        max_calls: usize,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let cutoff = now - TimeDelta::from_std(window)?;
        let lock_key = hash_as_i64(&("rate_window", account_id.as_str()))?;

        let mut tx = repo.pool.begin().await?;

        // Serializes concurrent checks for this account until commit.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(lock_key)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM rate_window WHERE account_id = $1 AND admitted_at <= $2")
            .bind(account_id.as_str())
            .bind(cutoff)
            .execute(&mut *tx)
            .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rate_window WHERE account_id = $1")
            .bind(account_id.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let admitted = usize::try_from(count)? < max_calls;
        if admitted {
            sqlx::query("INSERT INTO rate_window (account_id, admitted_at) VALUES ($1, $2)")
                .bind(account_id.as_str())
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(admitted)
    }
}

#[async_trait]
impl RateWindowStore for RateWindowRepositoryImpl {
    async fn try_admit(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
        window: Duration,
        max_calls: usize,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Self::try_admit_impl(self, account_id, now, window, max_calls).await
    }
}
