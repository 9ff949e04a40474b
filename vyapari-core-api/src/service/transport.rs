use async_trait::async_trait;

use crate::domain::{AccountId, Menu};
use crate::error::ApiResult;

/// Longest text a single outbound message may carry.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
    UploadDocument,
}

impl ChatAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatAction::Typing => "typing",
            ChatAction::UploadDocument => "upload_document",
        }
    }
}

/// A file sent to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

/// Outbound side of the chat transport.
///
/// Implementations live outside this workspace (Telegram bot API, test
/// doubles). Every call is a suspension point; failures are reported as
/// [`crate::ApiError::TransportError`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, account_id: &AccountId, text: &str, menu: Option<&Menu>) -> ApiResult<()>;

    async fn edit_message(
        &self,
        account_id: &AccountId,
        message_id: i64,
        text: &str,
        menu: Option<&Menu>,
    ) -> ApiResult<()>;

    /// Stops the client-side spinner of a pressed button.
    async fn answer_callback(&self, callback_id: &str) -> ApiResult<()>;

    async fn send_document(&self, account_id: &AccountId, document: OutboundDocument) -> ApiResult<()>;

    async fn send_chat_action(&self, account_id: &AccountId, action: ChatAction) -> ApiResult<()>;
}

/// Split text into chunks of at most [`MAX_MESSAGE_CHARS`] characters.
pub fn split_message(text: &str) -> Vec<&str> {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return vec![text];
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == MAX_MESSAGE_CHARS {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);
    chunks
}

/// Send `text` in as many messages as needed; the menu rides on the last one.
pub async fn send_text(
    transport: &dyn ChatTransport,
    account_id: &AccountId,
    text: &str,
    menu: Option<&Menu>,
) -> ApiResult<()> {
    let chunks = split_message(text);
    let last = chunks.len().saturating_sub(1);
    for (index, chunk) in chunks.into_iter().enumerate() {
        let menu = if index == last { menu } else { None };
        transport.send_message(account_id, chunk, menu).await?;
    }
    Ok(())
}
