use async_trait::async_trait;
use chrono::NaiveDate;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::repository::{ListInvoiceDates, Page, PageRequest};

use super::repo_impl::LedgerRepositoryImpl;

#[async_trait]
impl ListInvoiceDates for LedgerRepositoryImpl {
    async fn list_invoice_dates(
        &self,
        account_id: &AccountId,
        page: PageRequest,
    ) -> Result<Page<NaiveDate>, Box<dyn Error + Send + Sync>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT invoice_date) FROM ledger_transaction WHERE account_id = $1",
        )
        .bind(account_id.as_str())
        .fetch_one(&*self.pool)
        .await?;

        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT invoice_date
            FROM ledger_transaction
            WHERE account_id = $1
            ORDER BY invoice_date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id.as_str())
        .bind(i64::try_from(page.limit)?)
        .bind(i64::try_from(page.offset)?)
        .fetch_all(&*self.pool)
        .await?;

        Ok(Page::new(dates, usize::try_from(total)?, page.limit, page.offset))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use rust_decimal_macros::dec;
    use serial_test::serial;
    use vyapari_core_db::repository::{ListInvoiceDates, PageRequest, WriteTransaction};

    use super::super::test_utils::test_utils::{create_test_transaction, test_date};

    #[tokio::test]
    #[serial]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_list_invoice_dates_newest_first() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let account = &ctx.account_id;
        for (invoice, day) in [("INV_D1", 3), ("INV_D2", 5), ("INV_D3", 5), ("INV_D4", 4)] {
            let row = create_test_transaction(account, invoice, "tea", test_date(day), 1, dec!(10));
            ctx.ledger.write_transaction(row).await?;
        }

        let page = ctx.ledger.list_invoice_dates(account, PageRequest::first(2)).await?;
        assert_eq!(page.items, vec![test_date(5), test_date(4)]);
        assert_eq!(page.total, 3);
        assert!(page.has_more());

        Ok(())
    }
}
