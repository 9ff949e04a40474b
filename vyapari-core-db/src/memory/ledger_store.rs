use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use vyapari_core_api::domain::AccountId;

use crate::models::{AccountModel, AccountProfileUpdate, Identifiable, MessageLogEntryModel, TransactionModel};
use crate::repository::{
    AccountStore, DeleteTransaction, InvoiceNumberExists, ListInvoiceDates, ListInvoiceNumbers, ListItemNames,
    MessageLogStore, Page, PageRequest, ReadTransactions, StoreResult, WriteTransaction,
};
use crate::utils::DayRange;

#[derive(Default)]
struct State {
    transactions: Vec<TransactionModel>,
    accounts: HashMap<AccountId, AccountModel>,
    messages: HashMap<AccountId, Vec<MessageLogEntryModel>>,
    unavailable: bool,
    /// Remaining writes before the store starts failing
    write_budget: Option<usize>,
}

impl State {
    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable {
            return Err("ledger store unavailable".into());
        }
        Ok(())
    }
}

/// Ledger, account registry and message log held in memory.
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<RwLock<State>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail, as a dropped database connection would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unavailable = unavailable;
    }

    /// Let the next `writes` ledger writes succeed and fail the rest.
    pub fn fail_writes_after(&self, writes: Option<usize>) {
        self.state.write().write_budget = writes;
    }

    pub fn transaction_count(&self) -> usize {
        self.state.read().transactions.len()
    }
}

fn distinct_in_order<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[async_trait]
impl WriteTransaction for MemoryLedgerStore {
    async fn write_transaction(
        &self,
        item: TransactionModel,
    ) -> Result<TransactionModel, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write();
        state.check_available()?;
        if state.transactions.iter().any(|t| t.get_id() == item.get_id()) {
            return Err(format!("transaction {} already exists", item.get_id()).into());
        }
        if let Some(budget) = state.write_budget.as_mut() {
            if *budget == 0 {
                return Err("ledger store rejected the write".into());
            }
            *budget -= 1;
        }

        let account = state
            .accounts
            .entry(item.account_id.clone())
            .or_insert_with(|| AccountModel::new(item.account_id.clone(), None, item.created_at));
        account.total_transactions += 1;
        account.total_revenue += item.gross_total();

        state.transactions.push(item.clone());
        Ok(item)
    }
}

#[async_trait]
impl ReadTransactions for MemoryLedgerStore {
    async fn read_transactions(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TransactionModel>, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.read();
        state.check_available()?;
        let mut rows: Vec<TransactionModel> = state
            .transactions
            .iter()
            .filter(|t| &t.account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.created_at);
        Ok(rows)
    }
}

#[async_trait]
impl ListInvoiceDates for MemoryLedgerStore {
    async fn list_invoice_dates(
        &self,
        account_id: &AccountId,
        page: PageRequest,
    ) -> Result<Page<NaiveDate>, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.read();
        state.check_available()?;
        let mut dates: Vec<NaiveDate> = state
            .transactions
            .iter()
            .filter(|t| &t.account_id == account_id)
            .map(|t| t.invoice_date)
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(Page::slice(dates, page))
    }
}

#[async_trait]
impl ListInvoiceNumbers for MemoryLedgerStore {
    async fn list_invoice_numbers(
        &self,
        account_id: &AccountId,
        day: DayRange,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.read();
        state.check_available()?;
        let mut rows: Vec<&TransactionModel> = state
            .transactions
            .iter()
            .filter(|t| &t.account_id == account_id && day.contains(t.invoice_date))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(distinct_in_order(rows.into_iter().map(|t| t.invoice_number.clone())))
    }
}

#[async_trait]
impl ListItemNames for MemoryLedgerStore {
    async fn list_item_names(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.read();
        state.check_available()?;
        Ok(distinct_in_order(
            state
                .transactions
                .iter()
                .filter(|t| &t.account_id == account_id && t.invoice_number == invoice_number)
                .map(|t| t.item_name.clone()),
        ))
    }
}

#[async_trait]
impl DeleteTransaction for MemoryLedgerStore {
    async fn delete_transaction(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
        item_name: &str,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write();
        state.check_available()?;
        let before = state.transactions.len();
        state.transactions.retain(|t| {
            !(&t.account_id == account_id && t.invoice_number == invoice_number && t.item_name == item_name)
        });
        Ok(before - state.transactions.len())
    }
}

#[async_trait]
impl InvoiceNumberExists for MemoryLedgerStore {
    async fn invoice_number_exists(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.read();
        state.check_available()?;
        Ok(state
            .transactions
            .iter()
            .any(|t| &t.account_id == account_id && t.invoice_number == invoice_number))
    }
}

#[async_trait]
impl AccountStore for MemoryLedgerStore {
    async fn touch_account(
        &self,
        account_id: &AccountId,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(AccountModel, bool), Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write();
        state.check_available()?;
        if let Some(account) = state.accounts.get_mut(account_id) {
            account.last_active_at = now;
            if let Some(name) = display_name {
                account.display_name = Some(name.to_string());
            }
            return Ok((account.clone(), false));
        }
        let account = AccountModel::new(account_id.clone(), display_name.map(str::to_string), now);
        state.accounts.insert(account_id.clone(), account.clone());
        Ok((account, true))
    }

    async fn find_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<AccountModel>, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.read();
        state.check_available()?;
        Ok(state.accounts.get(account_id).cloned())
    }

    async fn set_phone_number(
        &self,
        account_id: &AccountId,
        phone_number: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write();
        state.check_available()?;
        Ok(match state.accounts.get_mut(account_id) {
            Some(account) => {
                account.phone_number = Some(phone_number.to_string());
                true
            }
            None => false,
        })
    }

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &AccountProfileUpdate,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write();
        state.check_available()?;
        let Some(account) = state.accounts.get_mut(account_id) else {
            return Ok(false);
        };
        if let Some(language) = &update.preferred_language {
            account.preferred_language = Some(language.clone());
        }
        if let Some(profile) = &update.company_profile {
            account.company_profile = Some(profile.clone());
        }
        Ok(true)
    }
}

#[async_trait]
impl MessageLogStore for MemoryLedgerStore {
    async fn append_message(
        &self,
        entry: MessageLogEntryModel,
        depth: usize,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write();
        state.check_available()?;
        let log = state.messages.entry(entry.account_id.clone()).or_default();
        if log
            .iter()
            .any(|m| m.logical_ts == entry.logical_ts && m.role == entry.role)
        {
            return Ok(false);
        }
        log.push(entry);
        log.sort_by_key(|m| (m.logical_ts, m.role));
        let excess = log.len().saturating_sub(depth);
        log.drain(..excess);
        Ok(true)
    }

    async fn recent_messages(
        &self,
        account_id: &AccountId,
        limit: usize,
    ) -> Result<Vec<MessageLogEntryModel>, Box<dyn std::error::Error + Send + Sync>> {
        let state = self.state.read();
        state.check_available()?;
        let Some(log) = state.messages.get(account_id) else {
            return Ok(Vec::new());
        };
        let skip = log.len().saturating_sub(limit);
        Ok(log[skip..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;
    use vyapari_core_api::domain::PaymentMethod;

    fn account() -> AccountId {
        AccountId::from(42i64)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn row(invoice: &str, item: &str, date: NaiveDate, qty: i32, price: Decimal) -> TransactionModel {
        TransactionModel {
            id: Uuid::new_v4(),
            account_id: account(),
            item_name: item.to_string(),
            item_code: None,
            quantity: qty,
            unit_price: price,
            tax_rate: dec!(18),
            discount_per_unit: Decimal::ZERO,
            invoice_date: date,
            invoice_number: invoice.to_string(),
            payment_method: PaymentMethod::Cash,
            currency: "INR".to_string(),
            customer_name: None,
            customer_details: None,
            raw_message: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn writes_update_rollup_once_per_row() {
        let store = MemoryLedgerStore::new();
        store.write_transaction(row("INV_1", "tea", day(5), 5, dec!(20))).await.unwrap();
        store.write_transaction(row("INV_1", "sugar", day(5), 2, dec!(45))).await.unwrap();

        let rows = store.read_transactions(&account()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.invoice_number == "INV_1"));

        let account = store.find_account(&account()).await.unwrap().unwrap();
        assert_eq!(account.total_transactions, 2);
        assert_eq!(account.total_revenue, dec!(190));
    }

    #[tokio::test]
    async fn lists_dates_invoices_and_items() {
        let store = MemoryLedgerStore::new();
        store.write_transaction(row("INV_A", "tea", day(4), 1, dec!(10))).await.unwrap();
        store.write_transaction(row("INV_B", "tea", day(5), 1, dec!(10))).await.unwrap();
        store.write_transaction(row("INV_B", "milk", day(5), 1, dec!(30))).await.unwrap();
        store.write_transaction(row("INV_B", "tea", day(5), 2, dec!(10))).await.unwrap();

        let dates = store.list_invoice_dates(&account(), PageRequest::first(10)).await.unwrap();
        assert_eq!(dates.items, vec![day(5), day(4)]);

        let capped = store.list_invoice_dates(&account(), PageRequest::first(1)).await.unwrap();
        assert_eq!(capped.items, vec![day(5)]);
        assert!(capped.has_more());

        let invoices = store.list_invoice_numbers(&account(), DayRange::utc(day(5))).await.unwrap();
        assert_eq!(invoices, vec!["INV_B".to_string()]);
        assert!(store.list_invoice_numbers(&account(), DayRange::utc(day(6))).await.unwrap().is_empty());

        let items = store.list_item_names(&account(), "INV_B").await.unwrap();
        assert_eq!(items, vec!["tea".to_string(), "milk".to_string()]);
    }

    #[tokio::test]
    async fn deleting_a_missing_item_changes_nothing() {
        let store = MemoryLedgerStore::new();
        store.write_transaction(row("INV_1", "tea", day(5), 1, dec!(10))).await.unwrap();

        assert_eq!(store.delete_transaction(&account(), "INV_1", "coffee").await.unwrap(), 0);
        assert_eq!(store.delete_transaction(&account(), "INV_9", "tea").await.unwrap(), 0);
        assert_eq!(store.transaction_count(), 1);

        assert_eq!(store.delete_transaction(&account(), "INV_1", "tea").await.unwrap(), 1);
        assert_eq!(store.transaction_count(), 0);
        assert!(!store.invoice_number_exists(&account(), "INV_1").await.unwrap());
    }

    #[tokio::test]
    async fn rewriting_a_row_id_is_rejected() {
        let store = MemoryLedgerStore::new();
        let first = row("INV_1", "tea", day(5), 1, dec!(10));
        store.write_transaction(first.clone()).await.unwrap();
        assert!(store.write_transaction(first).await.is_err());
        assert_eq!(store.transaction_count(), 1);
    }

    #[tokio::test]
    async fn other_accounts_are_invisible() {
        let store = MemoryLedgerStore::new();
        store.write_transaction(row("INV_1", "tea", day(5), 1, dec!(10))).await.unwrap();
        let other = AccountId::from(7i64);
        assert!(store.read_transactions(&other).await.unwrap().is_empty());
        assert!(!store.invoice_number_exists(&other, "INV_1").await.unwrap());
        assert_eq!(store.delete_transaction(&other, "INV_1", "tea").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn message_log_is_idempotent_and_bounded() {
        let store = MemoryLedgerStore::new();
        let now = Utc.with_ymd_and_hms(2025, 7, 5, 9, 0, 0).unwrap();
        for ts in 0..8 {
            let entry = MessageLogEntryModel::new(account(), format!("message {ts}"), ts, now);
            assert!(store.append_message(entry, 5).await.unwrap());
        }
        let duplicate = MessageLogEntryModel::new(account(), "message 7 again", 7, now);
        assert!(!store.append_message(duplicate, 5).await.unwrap());

        let recent = store.recent_messages(&account(), 10).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent.first().unwrap().logical_ts, 3);
        assert_eq!(recent.last().unwrap().text, "message 7");
    }

    #[tokio::test]
    async fn replies_share_the_timestamp_of_their_message() {
        let store = MemoryLedgerStore::new();
        let now = Utc.with_ymd_and_hms(2025, 7, 5, 9, 0, 0).unwrap();
        let reply = MessageLogEntryModel::new(account(), "recorded", 7, now).with_role(MessageRole::Assistant);
        assert!(store.append_message(reply.clone(), 5).await.unwrap());
        assert!(store.append_message(MessageLogEntryModel::new(account(), "sold 5 tea", 7, now), 5).await.unwrap());
        assert!(!store.append_message(reply, 5).await.unwrap());

        let roles: Vec<MessageRole> = store
            .recent_messages(&account(), 10)
            .await
            .unwrap()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
    }

    #[tokio::test]
    async fn touch_creates_then_refreshes() {
        let store = MemoryLedgerStore::new();
        let first = Utc.with_ymd_and_hms(2025, 7, 5, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 7, 6, 9, 0, 0).unwrap();

        let (created, is_new) = store.touch_account(&account(), Some("Asha"), first).await.unwrap();
        assert!(is_new);
        assert!(created.needs_phone_number());

        let (touched, is_new) = store.touch_account(&account(), None, later).await.unwrap();
        assert!(!is_new);
        assert_eq!(touched.registered_at, first);
        assert_eq!(touched.last_active_at, later);
        assert_eq!(touched.display_name.as_deref(), Some("Asha"));

        assert!(store.set_phone_number(&account(), "+919876543210").await.unwrap());
        let account = store.find_account(&account()).await.unwrap().unwrap();
        assert!(!account.needs_phone_number());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryLedgerStore::new();
        store.set_unavailable(true);
        assert!(store.write_transaction(row("INV_1", "tea", day(5), 1, dec!(10))).await.is_err());
        assert!(store.read_transactions(&account()).await.is_err());
        store.set_unavailable(false);
        assert!(store.read_transactions(&account()).await.unwrap().is_empty());
    }
}
