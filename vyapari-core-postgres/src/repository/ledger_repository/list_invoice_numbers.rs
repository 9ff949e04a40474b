use async_trait::async_trait;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::repository::ListInvoiceNumbers;
use vyapari_core_db::utils::DayRange;

use super::repo_impl::LedgerRepositoryImpl;

#[async_trait]
impl ListInvoiceNumbers for LedgerRepositoryImpl {
    async fn list_invoice_numbers(
        &self,
        account_id: &AccountId,
        day: DayRange,
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        let numbers: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT invoice_number
            FROM ledger_transaction
            WHERE account_id = $1 AND invoice_date >= $2 AND invoice_date < $3
            GROUP BY invoice_number
            ORDER BY MAX(created_at) DESC
            "#,
        )
        .bind(account_id.as_str())
        .bind(day.start)
        .bind(day.end)
        .fetch_all(&*self.pool)
        .await?;
        Ok(numbers)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use rust_decimal_macros::dec;
    use serial_test::serial;
    use vyapari_core_db::repository::{ListInvoiceNumbers, WriteTransaction};
    use vyapari_core_db::utils::DayRange;

    use super::super::test_utils::test_utils::{create_test_transaction, test_date};

    #[tokio::test]
    #[serial]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_list_invoice_numbers_for_one_day() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let account = &ctx.account_id;
        for (invoice, item, day) in [("INV_A", "tea", 5), ("INV_A", "milk", 5), ("INV_B", "tea", 6)] {
            let row = create_test_transaction(account, invoice, item, test_date(day), 1, dec!(10));
            ctx.ledger.write_transaction(row).await?;
        }

        let numbers = ctx.ledger.list_invoice_numbers(account, DayRange::utc(test_date(5))).await?;
        assert_eq!(numbers, vec!["INV_A".to_string()]);

        let none = ctx.ledger.list_invoice_numbers(account, DayRange::utc(test_date(7))).await?;
        assert!(none.is_empty());

        Ok(())
    }
}
