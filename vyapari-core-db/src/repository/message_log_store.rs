use async_trait::async_trait;
use vyapari_core_api::domain::AccountId;

use crate::models::message_log::MessageLogEntryModel;

/// Repository trait for the bounded per-account message history
#[async_trait]
pub trait MessageLogStore: Send + Sync {
    /// Insert `entry` unless (account, logical timestamp) is already logged,
    /// then drop all but the `depth` newest entries of the account
    ///
    /// # Returns
    /// * `Ok(true)` - The entry was inserted
    /// * `Ok(false)` - Duplicate; the log is unchanged
    async fn append_message(
        &self,
        entry: MessageLogEntryModel,
        depth: usize,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Up to `limit` newest entries, returned oldest first
    async fn recent_messages(
        &self,
        account_id: &AccountId,
        limit: usize,
    ) -> Result<Vec<MessageLogEntryModel>, Box<dyn std::error::Error + Send + Sync>>;
}
