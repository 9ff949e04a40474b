use async_trait::async_trait;
use std::error::Error;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::models::MessageLogEntryModel;
use vyapari_core_db::repository::MessageLogStore;

use super::repo_impl::LedgerRepositoryImpl;
use crate::utils::TryFromRow;

#[async_trait]
impl MessageLogStore for LedgerRepositoryImpl {
    async fn append_message(
        &self,
        entry: MessageLogEntryModel,
        depth: usize,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO message_log (id, account_id, role, text, logical_ts, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (account_id, logical_ts, role) DO NOTHING
            "#,
        )
        .bind(entry.id)
        .bind(entry.account_id.as_str())
        .bind(entry.role.as_str())
        .bind(&entry.text)
        .bind(entry.logical_ts)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            sqlx::query(
                r#"
                DELETE FROM message_log
                WHERE account_id = $1
                  AND id NOT IN (
                      SELECT id FROM message_log
                      WHERE account_id = $1
                      ORDER BY logical_ts DESC, role ASC
                      LIMIT $2
                  )
                "#,
            )
            .bind(entry.account_id.as_str())
            .bind(i64::try_from(depth)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn recent_messages(
        &self,
        account_id: &AccountId,
        limit: usize,
    ) -> Result<Vec<MessageLogEntryModel>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM (
                SELECT id, account_id, role, text, logical_ts, created_at
                FROM message_log
                WHERE account_id = $1
                ORDER BY logical_ts DESC, role ASC
                LIMIT $2
            ) newest
            ORDER BY logical_ts ASC, role DESC
            "#,
        )
        .bind(account_id.as_str())
        .bind(i64::try_from(limit)?)
        .fetch_all(&*self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(MessageLogEntryModel::try_from_row(&row)?);
        }
        Ok(entries)
    }
}
