use async_trait::async_trait;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::repository::ListItemNames;

use super::repo_impl::LedgerRepositoryImpl;

#[async_trait]
impl ListItemNames for LedgerRepositoryImpl {
    async fn list_item_names(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT item_name
            FROM ledger_transaction
            WHERE account_id = $1 AND invoice_number = $2
            GROUP BY item_name
            ORDER BY MIN(created_at)
            "#,
        )
        .bind(account_id.as_str())
        .bind(invoice_number)
        .fetch_all(&*self.pool)
        .await?;
        Ok(names)
    }
}
