use async_trait::async_trait;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::repository::DeleteTransaction;

use super::repo_impl::LedgerRepositoryImpl;

#[async_trait]
impl DeleteTransaction for LedgerRepositoryImpl {
    async fn delete_transaction(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
        item_name: &str,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        let result = sqlx::query(
            "DELETE FROM ledger_transaction WHERE account_id = $1 AND invoice_number = $2 AND item_name = $3",
        )
        .bind(account_id.as_str())
        .bind(invoice_number)
        .bind(item_name)
        .execute(&*self.pool)
        .await?;
        Ok(usize::try_from(result.rows_affected())?)
    }
}
