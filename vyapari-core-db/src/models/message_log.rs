use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vyapari_core_api::domain::AccountId;

use super::identifiable::Identifiable;

/// Who spoke a logged turn. Within one `logical_ts` the user turn sorts
/// before the reply it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    #[default]
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Prefix used when the history is rendered as context.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

/// One conversation turn kept for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLogEntryModel {
    pub id: Uuid,
    pub account_id: AccountId,
    pub role: MessageRole,
    pub text: String,
    /// Transport-assigned timestamp (unix seconds) of the inbound message.
    /// Together with `account_id` and `role` it is the de-duplication key.
    pub logical_ts: i64,
    pub created_at: DateTime<Utc>,
}

impl MessageLogEntryModel {
    pub fn new(account_id: AccountId, text: impl Into<String>, logical_ts: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            role: MessageRole::User,
            text: text.into(),
            logical_ts,
            created_at,
        }
    }

    pub fn with_role(mut self, role: MessageRole) -> Self {
        self.role = role;
        self
    }
}

impl Identifiable for MessageLogEntryModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}
