//! Request entry: classify inbound updates and route them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, warn};
use vyapari_core_api::domain::{AccountId, Menu, MenuButton};
use vyapari_core_api::error::{ApiError, ApiResult, ValidationError};
use vyapari_core_api::service::{send_text, ChatTransport};

use crate::accounts::AccountRegistry;
use crate::message_log::MessageLog;
use crate::rate_limit::RateLimiter;
use crate::wizard::{DeletionWizard, WizardReply, WizardState};

const RATE_LIMITED_TEXT: &str = "⏳ Too many requests. Please wait a minute and try again.";
const PHONE_REQUEST_TEXT: &str = "📱 Please share your phone number to continue.";
const PHONE_RECORDED_TEXT: &str = "✅ Thanks, your phone number is saved.";
const DELETE_COMMAND: &str = "/delete";

/// How long a message consumed by the wizard is remembered for retries.
const CONSUMED_TTL: Duration = Duration::from_secs(3600);
const MAX_CONSUMED: u64 = 100_000;

/// An update received from the chat transport.
///
/// The transport shell posts these as JSON tagged by `kind`, e.g.
/// `{"kind":"callback","account_id":"42","callback_id":"1","data":"del_recent"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundUpdate {
    Message {
        account_id: AccountId,
        #[serde(default)]
        display_name: Option<String>,
        text: String,
        /// Transport-assigned ordering key; redelivered updates repeat it.
        logical_ts: i64,
    },
    Callback {
        account_id: AccountId,
        callback_id: String,
        /// Message carrying the menu, edited in place when present.
        #[serde(default)]
        message_id: Option<i64>,
        data: String,
    },
    Contact {
        account_id: AccountId,
        phone_number: String,
    },
    /// Health checks and payloads without a sender.
    #[serde(other)]
    Unidentified,
}

impl InboundUpdate {
    /// Decode a transport payload. Unknown kinds become `Unidentified`.
    pub fn from_json(payload: &[u8]) -> ApiResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| ApiError::from(ValidationError::new("update", format!("malformed update: {e}"))))
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            InboundUpdate::Message { account_id, .. }
            | InboundUpdate::Callback { account_id, .. }
            | InboundUpdate::Contact { account_id, .. } => Some(account_id),
            InboundUpdate::Unidentified => None,
        }
    }
}

/// The conversational layer that handles free text (tool calls included).
#[async_trait]
pub trait ConversationHandler: Send + Sync {
    /// Returns the reply to send, if any. `history` is the rendered recent
    /// message log, newest last.
    async fn handle_message(&self, account_id: &AccountId, text: &str, history: &str) -> ApiResult<Option<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    RateLimited,
    Ignored,
    PhoneRequested,
    PhoneRecorded,
    Wizard(WizardState),
    Conversation,
}

pub struct RequestDispatcher {
    rate_limiter: Arc<RateLimiter>,
    accounts: AccountRegistry,
    message_log: MessageLog,
    wizard: Arc<DeletionWizard>,
    transport: Arc<dyn ChatTransport>,
    conversation: Arc<dyn ConversationHandler>,
    /// Messages the wizard consumed. They stay out of the message log, so
    /// retries of them are recognised here.
    consumed: Cache<(AccountId, i64), ()>,
}

impl RequestDispatcher {
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        accounts: AccountRegistry,
        message_log: MessageLog,
        wizard: Arc<DeletionWizard>,
        transport: Arc<dyn ChatTransport>,
        conversation: Arc<dyn ConversationHandler>,
    ) -> Self {
        Self {
            rate_limiter,
            accounts,
            message_log,
            wizard,
            transport,
            conversation,
            consumed: Cache::builder()
                .max_capacity(MAX_CONSUMED)
                .time_to_live(CONSUMED_TTL)
                .build(),
        }
    }

    pub async fn dispatch(&self, update: InboundUpdate) -> ApiResult<DispatchOutcome> {
        if self.rate_limiter.check(update.account_id()).await.is_rejected() {
            if let Some(account_id) = update.account_id() {
                send_text(self.transport.as_ref(), account_id, RATE_LIMITED_TEXT, None).await?;
            }
            return Ok(DispatchOutcome::RateLimited);
        }

        match update {
            InboundUpdate::Unidentified => {
                debug!("ignoring update without account");
                Ok(DispatchOutcome::Ignored)
            }
            InboundUpdate::Contact { account_id, phone_number } => {
                self.accounts.touch(&account_id, None).await?;
                if !self.accounts.record_phone_number(&account_id, &phone_number).await? {
                    return Ok(DispatchOutcome::Ignored);
                }
                send_text(self.transport.as_ref(), &account_id, PHONE_RECORDED_TEXT, None).await?;
                Ok(DispatchOutcome::PhoneRecorded)
            }
            InboundUpdate::Callback {
                account_id,
                callback_id,
                message_id,
                data,
            } => {
                self.accounts.touch(&account_id, None).await?;
                if let Err(e) = self.transport.answer_callback(&callback_id).await {
                    warn!(account_id = %account_id, error = %e, "callback not acknowledged");
                }
                match self.wizard.handle_callback(&account_id, &data).await? {
                    Some(reply) => self.deliver(&account_id, message_id, reply).await,
                    None => Ok(DispatchOutcome::Ignored),
                }
            }
            InboundUpdate::Message {
                account_id,
                display_name,
                text,
                logical_ts,
            } => {
                self.handle_message(&account_id, display_name.as_deref(), &text, logical_ts)
                    .await
            }
        }
    }

    async fn handle_message(
        &self,
        account_id: &AccountId,
        display_name: Option<&str>,
        text: &str,
        logical_ts: i64,
    ) -> ApiResult<DispatchOutcome> {
        let account = self.accounts.touch(account_id, display_name).await?;
        if account.needs_phone_number() {
            let menu = Menu::new().row(vec![MenuButton::request_contact("📱 Share phone number")]);
            send_text(self.transport.as_ref(), account_id, PHONE_REQUEST_TEXT, Some(&menu)).await?;
            return Ok(DispatchOutcome::PhoneRequested);
        }

        let key = (account_id.clone(), logical_ts);
        if self.consumed.contains_key(&key) {
            debug!(account_id = %account_id, logical_ts, "duplicate wizard message ignored");
            return Ok(DispatchOutcome::Ignored);
        }
        if text.trim().eq_ignore_ascii_case(DELETE_COMMAND) {
            self.consumed.insert(key, ()).await;
            let reply = self.wizard.start(account_id).await?;
            return self.deliver(account_id, None, reply).await;
        }
        if let Some(reply) = self.wizard.handle_text(account_id, text).await? {
            self.consumed.insert(key, ()).await;
            return self.deliver(account_id, None, reply).await;
        }

        if !self.message_log.log(account_id, text, logical_ts).await? {
            debug!(account_id = %account_id, logical_ts, "duplicate message ignored");
            return Ok(DispatchOutcome::Ignored);
        }
        let history = self.message_log.render_history(account_id).await?;
        if let Some(reply) = self.conversation.handle_message(account_id, text, &history).await? {
            send_text(self.transport.as_ref(), account_id, &reply, None).await?;
            if let Err(e) = self.message_log.log_reply(account_id, &reply, logical_ts).await {
                warn!(account_id = %account_id, logical_ts, error = %e, "reply not added to history");
            }
        }
        Ok(DispatchOutcome::Conversation)
    }

    async fn deliver(
        &self,
        account_id: &AccountId,
        message_id: Option<i64>,
        reply: WizardReply,
    ) -> ApiResult<DispatchOutcome> {
        match message_id {
            Some(message_id) => {
                self.transport
                    .edit_message(account_id, message_id, &reply.text, reply.menu.as_ref())
                    .await?
            }
            None => send_text(self.transport.as_ref(), account_id, &reply.text, reply.menu.as_ref()).await?,
        }
        Ok(DispatchOutcome::Wizard(reply.state))
    }
}
