use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use vyapari_core_api::domain::{looks_like_invoice_number, AccountId, CallbackToken, ListRef, Menu, INVOICE_PREFIX};
use vyapari_core_api::error::ApiResult;

use super::menus;
use super::session_store::SessionStore;
use super::state::{DeletionSession, WizardState};
use crate::ledger::{DeleteOutcome, TransactionLedger};

/// What the transport should show after a wizard step.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardReply {
    pub state: WizardState,
    pub text: String,
    pub menu: Option<Menu>,
}

impl WizardReply {
    fn new(state: WizardState, text: impl Into<String>, menu: Menu) -> Self {
        Self {
            state,
            text: text.into(),
            menu: Some(menu),
        }
    }
}

pub struct DeletionWizard {
    ledger: Arc<TransactionLedger>,
    sessions: SessionStore,
    recent_dates_limit: usize,
}

impl DeletionWizard {
    pub fn new(ledger: Arc<TransactionLedger>, sessions: SessionStore, recent_dates_limit: usize) -> Self {
        Self {
            ledger,
            sessions,
            recent_dates_limit: recent_dates_limit.max(1),
        }
    }

    /// `Root` when the account has no live session.
    pub async fn current_state(&self, account_id: &AccountId) -> WizardState {
        self.sessions
            .get(account_id)
            .await
            .map(|s| s.state)
            .unwrap_or(WizardState::Root)
    }

    /// Whether the next plain-text message belongs to the wizard.
    pub async fn is_awaiting_text(&self, account_id: &AccountId) -> bool {
        self.current_state(account_id).await == WizardState::AwaitingInvoiceNumber
    }

    pub async fn start(&self, account_id: &AccountId) -> ApiResult<WizardReply> {
        self.sessions.put(account_id, DeletionSession::default()).await;
        Ok(WizardReply::new(WizardState::Root, menus::ROOT_TEXT, menus::root_menu()?))
    }

    /// Advance the wizard on callback data. Unknown or malformed tokens
    /// return `None` and leave the session untouched.
    pub async fn handle_callback(&self, account_id: &AccountId, data: &str) -> ApiResult<Option<WizardReply>> {
        let Some(token) = CallbackToken::parse(data) else {
            debug!(account_id = %account_id, data, "ignoring unknown callback token");
            return Ok(None);
        };
        let session = self.sessions.get(account_id).await;

        let reply = match token {
            CallbackToken::Menu => self.start(account_id).await?,
            CallbackToken::Recent => self.show_dates(account_id).await?,
            CallbackToken::Search => {
                let session = DeletionSession {
                    state: WizardState::AwaitingInvoiceNumber,
                    ..DeletionSession::default()
                };
                self.sessions.put(account_id, session).await;
                WizardReply::new(WizardState::AwaitingInvoiceNumber, menus::AWAITING_TEXT, menus::awaiting_menu()?)
            }
            CallbackToken::Date(date) => self.show_invoices(account_id, date).await?,
            CallbackToken::Invoice { date, invoice } => {
                let listing = session.as_ref().filter(|s| s.selected_date == Some(date));
                match resolve(&invoice, listing, WizardState::InvoiceList) {
                    Some(invoice) => self.show_items(account_id, Some(date), invoice).await?,
                    None => self.expired(account_id).await?,
                }
            }
            CallbackToken::Item { invoice, item } => {
                let invoice = match invoice {
                    ListRef::Listed(_) => None,
                    other => resolve(&other, session.as_ref(), WizardState::ItemList),
                };
                let listing = session
                    .as_ref()
                    .filter(|s| invoice.is_some() && s.selected_invoice == invoice);
                let item = resolve(&item, listing, WizardState::ItemList);
                match (invoice, item) {
                    (Some(invoice), Some(item)) => self.delete(account_id, &invoice, &item).await?,
                    _ => self.expired(account_id).await?,
                }
            }
            CallbackToken::Cancel(level) => {
                debug!(account_id = %account_id, level = level.as_str(), "deletion cancelled");
                self.finish(account_id, WizardState::Cancelled, menus::CANCELLED_TEXT).await?
            }
        };
        Ok(Some(reply))
    }

    /// Consume a plain-text message while an invoice-number search is
    /// pending. Returns `None` when the wizard is not waiting for text.
    pub async fn handle_text(&self, account_id: &AccountId, text: &str) -> ApiResult<Option<WizardReply>> {
        if !self.is_awaiting_text(account_id).await {
            return Ok(None);
        }
        let text = text.trim();
        if text.eq_ignore_ascii_case("/cancel") || text.eq_ignore_ascii_case("cancel") {
            let reply = self.finish(account_id, WizardState::Cancelled, menus::CANCELLED_TEXT).await?;
            return Ok(Some(reply));
        }

        let items = self.ledger.list_item_names(account_id, text).await?;
        if items.is_empty() {
            let mut reply = format!("No invoice {text} found.");
            if !looks_like_invoice_number(text) {
                reply.push_str(&format!(" Invoice numbers start with {INVOICE_PREFIX}."));
            }
            reply.push_str(" Send another invoice number or type cancel.");
            return Ok(Some(WizardReply::new(
                WizardState::AwaitingInvoiceNumber,
                reply,
                menus::awaiting_menu()?,
            )));
        }
        self.list_items(account_id, None, text.to_string(), items).await.map(Some)
    }

    async fn show_dates(&self, account_id: &AccountId) -> ApiResult<WizardReply> {
        let dates = self
            .ledger
            .list_invoice_dates(account_id, Some(self.recent_dates_limit))
            .await?;
        if dates.is_empty() {
            return self.finish(account_id, WizardState::NoResults, menus::NO_DATES_TEXT).await;
        }
        let menu = menus::date_menu(&dates)?;
        let session = DeletionSession {
            state: WizardState::DateList,
            ..DeletionSession::default()
        };
        self.sessions.put(account_id, session).await;
        Ok(WizardReply::new(WizardState::DateList, "📅 Choose a date:", menu))
    }

    async fn show_invoices(&self, account_id: &AccountId, date: NaiveDate) -> ApiResult<WizardReply> {
        let invoices = self.ledger.list_invoice_numbers(account_id, date).await?;
        let label = menus::date_label(date);
        if invoices.is_empty() {
            return self
                .finish(account_id, WizardState::NoResults, format!("No invoices on {label}."))
                .await;
        }
        let menu = menus::invoice_menu(date, &invoices)?;
        let session = DeletionSession {
            state: WizardState::InvoiceList,
            selected_date: Some(date),
            selected_invoice: None,
            listed: invoices,
        };
        self.sessions.put(account_id, session).await;
        Ok(WizardReply::new(
            WizardState::InvoiceList,
            format!("🧾 Invoices on {label}:"),
            menu,
        ))
    }

    async fn show_items(
        &self,
        account_id: &AccountId,
        date: Option<NaiveDate>,
        invoice: String,
    ) -> ApiResult<WizardReply> {
        let items = self.ledger.list_item_names(account_id, &invoice).await?;
        if items.is_empty() {
            return self
                .finish(account_id, WizardState::NoResults, format!("No items left on invoice {invoice}."))
                .await;
        }
        self.list_items(account_id, date, invoice, items).await
    }

    async fn list_items(
        &self,
        account_id: &AccountId,
        date: Option<NaiveDate>,
        invoice: String,
        items: Vec<String>,
    ) -> ApiResult<WizardReply> {
        let menu = menus::item_menu(&invoice, &items)?;
        let text = format!("Items on invoice {invoice}. Tap one to delete it:");
        let session = DeletionSession {
            state: WizardState::ItemList,
            selected_date: date,
            selected_invoice: Some(invoice),
            listed: items,
        };
        self.sessions.put(account_id, session).await;
        Ok(WizardReply::new(WizardState::ItemList, text, menu))
    }

    async fn delete(&self, account_id: &AccountId, invoice: &str, item: &str) -> ApiResult<WizardReply> {
        match self.ledger.delete_transaction(account_id, invoice, item).await? {
            DeleteOutcome::Deleted(_) => {
                info!(account_id = %account_id, invoice, item, "line item deleted through wizard");
                self.finish(account_id, WizardState::Deleted, format!("✅ Deleted {item} from invoice {invoice}."))
                    .await
            }
            DeleteOutcome::NothingDeleted => {
                self.finish(
                    account_id,
                    WizardState::NothingDeleted,
                    format!("{item} is no longer on invoice {invoice}. Nothing was deleted."),
                )
                .await
            }
        }
    }

    async fn expired(&self, account_id: &AccountId) -> ApiResult<WizardReply> {
        self.sessions.put(account_id, DeletionSession::default()).await;
        Ok(WizardReply::new(
            WizardState::Root,
            format!("{}\n\n{}", menus::EXPIRED_TEXT, menus::ROOT_TEXT),
            menus::root_menu()?,
        ))
    }

    /// End the flow: drop the session and offer a fresh start.
    async fn finish(
        &self,
        account_id: &AccountId,
        state: WizardState,
        text: impl Into<String>,
    ) -> ApiResult<WizardReply> {
        self.sessions.clear(account_id).await;
        let text = format!("{}\n\n{}", text.into(), menus::RECORD_PROMPT);
        Ok(WizardReply::new(state, text, menus::restart_menu(Utc::now().date_naive())?))
    }
}

/// Turn a token reference back into the value it stands for. List
/// references only resolve against a session showing the `expected` list;
/// callers narrow `session` to the listing the token was built from.
fn resolve(reference: &ListRef, session: Option<&DeletionSession>, expected: WizardState) -> Option<String> {
    match reference {
        ListRef::Value(value) => Some(value.clone()),
        ListRef::Selected => session.and_then(|s| s.selected_invoice.clone()),
        ListRef::Listed(index) => session
            .filter(|s| s.state == expected)
            .and_then(|s| s.listed.get(*index).cloned()),
    }
}
