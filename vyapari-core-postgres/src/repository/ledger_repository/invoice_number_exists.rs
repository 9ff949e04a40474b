use async_trait::async_trait;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::repository::InvoiceNumberExists;

use super::repo_impl::LedgerRepositoryImpl;

#[async_trait]
impl InvoiceNumberExists for LedgerRepositoryImpl {
    async fn invoice_number_exists(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM ledger_transaction WHERE account_id = $1 AND invoice_number = $2)",
        )
        .bind(account_id.as_str())
        .bind(invoice_number)
        .fetch_one(&*self.pool)
        .await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use rust_decimal_macros::dec;
    use serial_test::serial;
    use vyapari_core_db::repository::{InvoiceNumberExists, WriteTransaction};

    use super::super::test_utils::test_utils::{create_test_transaction, test_date};

    #[tokio::test]
    #[serial]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_invoice_number_exists() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let account = &ctx.account_id;
        assert!(!ctx.ledger.invoice_number_exists(account, "INV_E").await?);

        let row = create_test_transaction(account, "INV_E", "tea", test_date(5), 1, dec!(10));
        ctx.ledger.write_transaction(row).await?;
        assert!(ctx.ledger.invoice_number_exists(account, "INV_E").await?);

        Ok(())
    }
}
