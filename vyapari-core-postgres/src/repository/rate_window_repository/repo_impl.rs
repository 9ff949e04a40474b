use sqlx::PgPool;
use std::sync::Arc;

/// Sliding windows shared by every worker connected to the same database.
pub struct RateWindowRepositoryImpl {
    pub pool: Arc<PgPool>,
}

impl RateWindowRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}
