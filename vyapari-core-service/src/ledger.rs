//! Transaction ledger service.
//!
//! Wraps a [`LedgerStore`] with argument validation, a per-account write
//! lock and CSV export. Store failures surface as retryable
//! [`ApiError::StorageError`]s.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{error, info};
use vyapari_core_api::domain::{AccountId, InvoiceDocument};
use vyapari_core_api::error::{ApiError, ApiResult, ValidationError};
use vyapari_core_db::models::TransactionModel;
use vyapari_core_db::repository::{
    DeleteTransaction, InvoiceNumberExists, LedgerStore, ListInvoiceDates, ListInvoiceNumbers, ListItemNames,
    PageRequest, ReadTransactions, WriteTransaction,
};
use vyapari_core_db::utils::DayRange;

/// Idle lock entries are pruned once the map grows past this size.
const LOCK_MAP_PRUNE_THRESHOLD: usize = 1024;

/// Result of a line-item delete. Matching nothing is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(usize),
    NothingDeleted,
}

/// Result of a CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvExport {
    /// The account has no transactions; no file is produced.
    NoData,
    Data { file_name: String, bytes: Vec<u8>, rows: usize },
}

pub(crate) fn storage_failure<'a>(
    operation: &'static str,
    account_id: &'a AccountId,
) -> impl FnOnce(Box<dyn std::error::Error + Send + Sync>) -> ApiError + 'a {
    move |e| {
        error!(account_id = %account_id, operation, error = %e, "ledger store failure");
        ApiError::storage(e)
    }
}

/// Reject rows that would break ledger invariants.
pub fn validate_row(row: &TransactionModel) -> Result<(), ValidationError> {
    if row.item_name.trim().is_empty() {
        return Err(ValidationError::new("item_name", "must not be empty"));
    }
    if row.quantity <= 0 {
        return Err(ValidationError::new("quantity", "must be a positive integer"));
    }
    if row.unit_price <= Decimal::ZERO {
        return Err(ValidationError::new("unit_price", "must be greater than zero"));
    }
    if row.tax_rate < Decimal::ZERO {
        return Err(ValidationError::new("tax_rate", "cannot be negative"));
    }
    if row.discount_per_unit < Decimal::ZERO {
        return Err(ValidationError::new("discount", "cannot be negative"));
    }
    if row.discount_per_unit > row.unit_price {
        return Err(ValidationError::new("discount", "cannot exceed the unit price"));
    }
    if row.invoice_number.trim().is_empty() {
        return Err(ValidationError::new("invoice_number", "must not be empty"));
    }
    Ok(())
}

pub struct TransactionLedger {
    store: Arc<dyn LedgerStore>,
    currency: String,
    locks: Mutex<HashMap<AccountId, Arc<AsyncMutex<()>>>>,
}

impl TransactionLedger {
    pub fn new(store: Arc<dyn LedgerStore>, currency: impl Into<String>) -> Self {
        Self {
            store,
            currency: currency.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Serialize invoice generation for one account. Held from number
    /// allocation until the last row is written.
    pub async fn lock_account(&self, account_id: &AccountId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            if locks.len() > LOCK_MAP_PRUNE_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(account_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub async fn write_transaction(&self, row: TransactionModel) -> ApiResult<TransactionModel> {
        validate_row(&row)?;
        let account_id = row.account_id.clone();
        self.store
            .write_transaction(row)
            .await
            .map_err(storage_failure("write_transaction", &account_id))
    }

    /// Write one row per document line, in line order.
    ///
    /// Stops at the first failure; rows already written stay, so a failed
    /// call leaves a prefix of the invoice in the ledger.
    pub async fn write_invoice(
        &self,
        document: &InvoiceDocument,
        raw_message: &str,
        created_at: DateTime<Utc>,
    ) -> ApiResult<Vec<TransactionModel>> {
        let mut written = Vec::with_capacity(document.lines.len());
        for line in &document.lines {
            let row = TransactionModel::from_invoice_line(document, line, raw_message, &self.currency, created_at);
            match self.write_transaction(row).await {
                Ok(row) => written.push(row),
                Err(e) => {
                    error!(
                        account_id = %document.account_id,
                        invoice_number = %document.invoice_number,
                        written = written.len(),
                        total = document.lines.len(),
                        "invoice only partially recorded"
                    );
                    return Err(e);
                }
            }
        }
        info!(
            account_id = %document.account_id,
            invoice_number = %document.invoice_number,
            rows = written.len(),
            "invoice recorded"
        );
        Ok(written)
    }

    pub async fn read_transactions(&self, account_id: &AccountId) -> ApiResult<Vec<TransactionModel>> {
        self.store
            .read_transactions(account_id)
            .await
            .map_err(storage_failure("read_transactions", account_id))
    }

    /// Distinct invoice dates, newest first, optionally capped.
    pub async fn list_invoice_dates(&self, account_id: &AccountId, limit: Option<usize>) -> ApiResult<Vec<NaiveDate>> {
        let page = PageRequest::first(limit.unwrap_or(u32::MAX as usize));
        let page = self
            .store
            .list_invoice_dates(account_id, page)
            .await
            .map_err(storage_failure("list_invoice_dates", account_id))?;
        Ok(page.items)
    }

    /// Invoice numbers dated within the UTC day `date`.
    pub async fn list_invoice_numbers(&self, account_id: &AccountId, date: NaiveDate) -> ApiResult<Vec<String>> {
        self.store
            .list_invoice_numbers(account_id, DayRange::utc(date))
            .await
            .map_err(storage_failure("list_invoice_numbers", account_id))
    }

    pub async fn list_item_names(&self, account_id: &AccountId, invoice_number: &str) -> ApiResult<Vec<String>> {
        self.store
            .list_item_names(account_id, invoice_number)
            .await
            .map_err(storage_failure("list_item_names", account_id))
    }

    pub async fn invoice_number_exists(&self, account_id: &AccountId, invoice_number: &str) -> ApiResult<bool> {
        self.store
            .invoice_number_exists(account_id, invoice_number)
            .await
            .map_err(storage_failure("invoice_number_exists", account_id))
    }

    pub async fn delete_transaction(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
        item_name: &str,
    ) -> ApiResult<DeleteOutcome> {
        let removed = self
            .store
            .delete_transaction(account_id, invoice_number, item_name)
            .await
            .map_err(storage_failure("delete_transaction", account_id))?;
        if removed == 0 {
            return Ok(DeleteOutcome::NothingDeleted);
        }
        info!(account_id = %account_id, invoice_number, item_name, removed, "transaction deleted");
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// All rows of the account as CSV; the header is the row's field names.
    pub async fn export_csv(&self, account_id: &AccountId) -> ApiResult<CsvExport> {
        let rows = self.read_transactions(account_id).await?;
        if rows.is_empty() {
            return Ok(CsvExport::NoData);
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &rows {
            writer
                .serialize(row)
                .map_err(|e| ApiError::InternalError(format!("csv encoding failed: {e}")))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ApiError::InternalError(format!("csv encoding failed: {e}")))?;

        Ok(CsvExport::Data {
            file_name: format!("transactions_{account_id}.csv"),
            bytes,
            rows: rows.len(),
        })
    }
}
