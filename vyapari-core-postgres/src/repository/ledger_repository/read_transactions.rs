use async_trait::async_trait;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::models::TransactionModel;
use vyapari_core_db::repository::ReadTransactions;

use super::repo_impl::{LedgerRepositoryImpl, TRANSACTION_COLUMNS};
use crate::utils::TryFromRow;

#[async_trait]
impl ReadTransactions for LedgerRepositoryImpl {
    async fn read_transactions(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TransactionModel>, Box<dyn Error + Send + Sync>> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM ledger_transaction WHERE account_id = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query(&query)
            .bind(account_id.as_str())
            .fetch_all(&*self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(TransactionModel::try_from_row(&row)?);
        }
        Ok(items)
    }
}
