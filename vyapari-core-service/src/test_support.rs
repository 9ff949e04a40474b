//! Test doubles for the outbound boundaries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use vyapari_core_api::domain::{AccountId, Menu};
use vyapari_core_api::error::{ApiError, ApiResult};
use vyapari_core_api::service::{ChatAction, ChatTransport, OutboundDocument};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message { account_id: AccountId, text: String, menu: Option<Menu> },
    Edit { account_id: AccountId, message_id: i64, text: String, menu: Option<Menu> },
    CallbackAnswer(String),
    Document { account_id: AccountId, document: OutboundDocument },
    Action { account_id: AccountId, action: ChatAction },
}

/// Records everything sent; document delivery can be made to fail or stall.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    fail_documents: Mutex<bool>,
    document_delay: Mutex<Option<Duration>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_documents(&self, fail: bool) {
        *self.fail_documents.lock() = fail;
    }

    pub fn delay_documents(&self, delay: Option<Duration>) {
        *self.document_delay.lock() = delay;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Message { text, .. } | Sent::Edit { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn documents(&self) -> Vec<OutboundDocument> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Document { document, .. } => Some(document.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn action_count(&self) -> usize {
        self.sent.lock().iter().filter(|s| matches!(s, Sent::Action { .. })).count()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, account_id: &AccountId, text: &str, menu: Option<&Menu>) -> ApiResult<()> {
        self.sent.lock().push(Sent::Message {
            account_id: account_id.clone(),
            text: text.to_string(),
            menu: menu.cloned(),
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        account_id: &AccountId,
        message_id: i64,
        text: &str,
        menu: Option<&Menu>,
    ) -> ApiResult<()> {
        self.sent.lock().push(Sent::Edit {
            account_id: account_id.clone(),
            message_id,
            text: text.to_string(),
            menu: menu.cloned(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> ApiResult<()> {
        self.sent.lock().push(Sent::CallbackAnswer(callback_id.to_string()));
        Ok(())
    }

    async fn send_document(&self, account_id: &AccountId, document: OutboundDocument) -> ApiResult<()> {
        let delay = *self.document_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_documents.lock() {
            return Err(ApiError::transport("document upload failed"));
        }
        self.sent.lock().push(Sent::Document {
            account_id: account_id.clone(),
            document,
        });
        Ok(())
    }

    async fn send_chat_action(&self, account_id: &AccountId, action: ChatAction) -> ApiResult<()> {
        self.sent.lock().push(Sent::Action {
            account_id: account_id.clone(),
            action,
        });
        Ok(())
    }
}
