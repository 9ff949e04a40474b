use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::models::{AccountModel, AccountProfileUpdate};
use vyapari_core_db::repository::AccountStore;

use super::repo_impl::{LedgerRepositoryImpl, ACCOUNT_COLUMNS};
use crate::utils::TryFromRow;

#[async_trait]
impl AccountStore for LedgerRepositoryImpl {
    async fn touch_account(
        &self,
        account_id: &AccountId,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(AccountModel, bool), Box<dyn Error + Send + Sync>> {
        // xmax is zero only for a freshly inserted tuple.
        let query = format!(
            r#"
            INSERT INTO account (account_id, display_name, registered_at, last_active_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (account_id) DO UPDATE
            SET last_active_at = EXCLUDED.last_active_at,
                display_name = COALESCE(EXCLUDED.display_name, account.display_name)
            RETURNING {ACCOUNT_COLUMNS}, (xmax = 0) AS inserted
            "#
        );
        let row = sqlx::query(&query)
            .bind(account_id.as_str())
            .bind(display_name)
            .bind(now)
            .fetch_one(&*self.pool)
            .await?;

        let inserted: bool = row.try_get("inserted")?;
        Ok((AccountModel::try_from_row(&row)?, inserted))
    }

    async fn find_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<AccountModel>, Box<dyn Error + Send + Sync>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE account_id = $1");
        let row = sqlx::query(&query)
            .bind(account_id.as_str())
            .fetch_optional(&*self.pool)
            .await?;
        row.map(|r| AccountModel::try_from_row(&r)).transpose()
    }

    async fn set_phone_number(
        &self,
        account_id: &AccountId,
        phone_number: &str,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let result = sqlx::query("UPDATE account SET phone_number = $2 WHERE account_id = $1")
            .bind(account_id.as_str())
            .bind(phone_number)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &AccountProfileUpdate,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            UPDATE account
            SET preferred_language = COALESCE($2, preferred_language),
                company_profile = COALESCE($3, company_profile)
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_str())
        .bind(&update.preferred_language)
        .bind(&update.company_profile)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
