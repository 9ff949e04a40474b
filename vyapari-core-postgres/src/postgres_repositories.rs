use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::repository::ledger_repository::LedgerRepositoryImpl;
use crate::repository::rate_window_repository::RateWindowRepositoryImpl;

/// Entry point for the PostgreSQL-backed stores; all repositories share one pool.
#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Connect a pool sized for the blocking worker count.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ledger rows, account registry and message log.
    pub fn ledger_repository(&self) -> Arc<LedgerRepositoryImpl> {
        Arc::new(LedgerRepositoryImpl::new(self.pool.clone()))
    }

    /// Shared sliding windows for the rate limiter.
    pub fn rate_window_repository(&self) -> Arc<RateWindowRepositoryImpl> {
        Arc::new(RateWindowRepositoryImpl::new(self.pool.clone()))
    }
}
