use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use vyapari_core_api::domain::AccountId;
use vyapari_core_api::error::ApiResult;
use vyapari_core_db::models::{MessageLogEntryModel, MessageRole};
use vyapari_core_db::repository::{LedgerStore, MessageLogStore};

use crate::ledger::storage_failure;

/// Bounded conversation history, used only to build context for the
/// conversational layer.
#[derive(Clone)]
pub struct MessageLog {
    store: Arc<dyn LedgerStore>,
    depth: usize,
}

impl MessageLog {
    pub fn new(store: Arc<dyn LedgerStore>, depth: usize) -> Self {
        Self { store, depth }
    }

    /// Log an inbound message. Returns `false` for a transport retry of a
    /// message already logged.
    pub async fn log(&self, account_id: &AccountId, text: &str, logical_ts: i64) -> ApiResult<bool> {
        self.append(account_id, MessageRole::User, text, logical_ts).await
    }

    /// Log the reply to the message stamped `logical_ts`.
    pub async fn log_reply(&self, account_id: &AccountId, text: &str, logical_ts: i64) -> ApiResult<bool> {
        self.append(account_id, MessageRole::Assistant, text, logical_ts).await
    }

    async fn append(&self, account_id: &AccountId, role: MessageRole, text: &str, logical_ts: i64) -> ApiResult<bool> {
        let entry = MessageLogEntryModel::new(account_id.clone(), text, logical_ts, Utc::now()).with_role(role);
        let inserted = self
            .store
            .append_message(entry, self.depth)
            .await
            .map_err(storage_failure("append_message", account_id))?;
        if !inserted {
            debug!(account_id = %account_id, logical_ts, role = role.as_str(), "duplicate turn ignored");
        }
        Ok(inserted)
    }

    pub async fn recent(&self, account_id: &AccountId) -> ApiResult<Vec<MessageLogEntryModel>> {
        self.store
            .recent_messages(account_id, self.depth)
            .await
            .map_err(storage_failure("recent_messages", account_id))
    }

    /// Oldest-first history as `[yyyy-mm-dd HH:MM:SS] Role: text` lines.
    pub async fn render_history(&self, account_id: &AccountId) -> ApiResult<String> {
        let mut out = String::new();
        for entry in self.recent(account_id).await? {
            let at = DateTime::<Utc>::from_timestamp(entry.logical_ts, 0).unwrap_or(entry.created_at);
            let _ = writeln!(
                out,
                "[{}] {}: {}",
                at.format("%Y-%m-%d %H:%M:%S"),
                entry.role.label(),
                entry.text
            );
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vyapari_core_db::memory::MemoryLedgerStore;

    const JULY_5_0900: i64 = 1_751_706_000;

    #[tokio::test]
    async fn never_exceeds_depth_and_ignores_retries() {
        let log = MessageLog::new(Arc::new(MemoryLedgerStore::new()), 5);
        let account = AccountId::from(42i64);

        for i in 0..9 {
            log.log(&account, &format!("message {i}"), JULY_5_0900 + i).await.unwrap();
            assert!(log.recent(&account).await.unwrap().len() <= 5);
        }
        assert!(!log.log(&account, "message 8", JULY_5_0900 + 8).await.unwrap());

        let recent = log.recent(&account).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].text, "message 4");
    }

    #[tokio::test]
    async fn renders_timestamped_lines() {
        let log = MessageLog::new(Arc::new(MemoryLedgerStore::new()), 5);
        let account = AccountId::from(42i64);
        log.log(&account, "sold 5 tea", JULY_5_0900).await.unwrap();
        log.log_reply(&account, "Invoice INV_42 recorded", JULY_5_0900).await.unwrap();
        log.log(&account, "delete last invoice", JULY_5_0900 + 60).await.unwrap();

        let history = log.render_history(&account).await.unwrap();
        assert_eq!(
            history,
            "[2025-07-05 09:00:00] User: sold 5 tea\n\
             [2025-07-05 09:00:00] Assistant: Invoice INV_42 recorded\n\
             [2025-07-05 09:01:00] User: delete last invoice\n"
        );
    }
}
