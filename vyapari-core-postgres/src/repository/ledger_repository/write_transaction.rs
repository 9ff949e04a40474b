use async_trait::async_trait;
use std::error::Error;
use vyapari_core_db::models::TransactionModel;
use vyapari_core_db::repository::WriteTransaction;

use super::repo_impl::LedgerRepositoryImpl;

impl LedgerRepositoryImpl {
    pub(super) async fn write_transaction_impl(
        repo: &LedgerRepositoryImpl,
        item: TransactionModel,
    ) -> Result<TransactionModel, Box<dyn Error + Send + Sync>> {
        let mut tx = repo.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO account (account_id, registered_at, last_active_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(item.account_id.as_str())
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO ledger_transaction (
                id, account_id, item_name, item_code, quantity, unit_price, tax_rate,
                discount_per_unit, invoice_date, invoice_number, payment_method, currency,
                customer_name, customer_details, raw_message, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(item.id)
        .bind(item.account_id.as_str())
        .bind(&item.item_name)
        .bind(&item.item_code)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.tax_rate)
        .bind(item.discount_per_unit)
        .bind(item.invoice_date)
        .bind(&item.invoice_number)
        .bind(item.payment_method)
        .bind(&item.currency)
        .bind(&item.customer_name)
        .bind(&item.customer_details)
        .bind(&item.raw_message)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE account
            SET total_transactions = total_transactions + 1,
                total_revenue = total_revenue + $2
            WHERE account_id = $1
            "#,
        )
        .bind(item.account_id.as_str())
        .bind(item.gross_total())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(item)
    }
}

#[async_trait]
impl WriteTransaction for LedgerRepositoryImpl {
    async fn write_transaction(
        &self,
        item: TransactionModel,
    ) -> Result<TransactionModel, Box<dyn Error + Send + Sync>> {
        Self::write_transaction_impl(self, item).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use rust_decimal_macros::dec;
    use serial_test::serial;
    use vyapari_core_db::repository::{AccountStore, ReadTransactions, WriteTransaction};

    use super::super::test_utils::test_utils::{create_test_transaction, test_date};

    #[tokio::test]
    #[serial]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_write_transaction_updates_rollup() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let account = &ctx.account_id;

        let tea = create_test_transaction(account, "INV_T1", "tea", test_date(5), 5, dec!(20));
        let sugar = create_test_transaction(account, "INV_T1", "sugar", test_date(5), 2, dec!(45));
        ctx.ledger.write_transaction(tea).await?;
        ctx.ledger.write_transaction(sugar).await?;

        let rows = ctx.ledger.read_transactions(account).await?;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.invoice_number == "INV_T1"));

        let stored = ctx.ledger.find_account(account).await?.expect("account created by first write");
        assert_eq!(stored.total_transactions, 2);
        assert_eq!(stored.total_revenue, dec!(190));

        Ok(())
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn test_write_transaction_keeps_price_scale() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let account = &ctx.account_id;

        let mut saffron = create_test_transaction(account, "INV_T2", "saffron", test_date(5), 3, dec!(12.345678));
        saffron.discount_per_unit = dec!(0.000125);
        ctx.ledger.write_transaction(saffron).await?;

        let rows = ctx.ledger.read_transactions(account).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].unit_price, dec!(12.345678));
        assert_eq!(rows[0].unit_price.scale(), 6);
        assert_eq!(rows[0].discount_per_unit, dec!(0.000125));

        Ok(())
    }
}
