use sqlx::{postgres::PgRow, PgPool, Row};
use std::error::Error;
use std::sync::Arc;
use vyapari_core_api::domain::AccountId;
use vyapari_core_db::models::{AccountModel, MessageLogEntryModel, MessageRole, TransactionModel};

use crate::utils::TryFromRow;

/// PostgreSQL implementation of every `LedgerStore` operation.
pub struct LedgerRepositoryImpl {
    pub pool: Arc<PgPool>,
}

impl LedgerRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

pub(crate) const TRANSACTION_COLUMNS: &str = "id, account_id, item_name, item_code, quantity, unit_price, tax_rate, \
     discount_per_unit, invoice_date, invoice_number, payment_method, currency, customer_name, \
     customer_details, raw_message, created_at";

pub(crate) const ACCOUNT_COLUMNS: &str = "account_id, display_name, registered_at, last_active_at, \
     subscription_tier, plan_start, plan_end, phone_number, preferred_language, company_profile, \
     total_transactions, total_revenue";

impl TryFromRow<PgRow> for TransactionModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(TransactionModel {
            id: row.try_get("id")?,
            account_id: AccountId::new(row.try_get::<String, _>("account_id")?),
            item_name: row.try_get("item_name")?,
            item_code: row.try_get("item_code")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            tax_rate: row.try_get("tax_rate")?,
            discount_per_unit: row.try_get("discount_per_unit")?,
            invoice_date: row.try_get("invoice_date")?,
            invoice_number: row.try_get("invoice_number")?,
            payment_method: row.try_get("payment_method")?,
            currency: row.try_get("currency")?,
            customer_name: row.try_get("customer_name")?,
            customer_details: row.try_get("customer_details")?,
            raw_message: row.try_get("raw_message")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFromRow<PgRow> for AccountModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(AccountModel {
            account_id: AccountId::new(row.try_get::<String, _>("account_id")?),
            display_name: row.try_get("display_name")?,
            registered_at: row.try_get("registered_at")?,
            last_active_at: row.try_get("last_active_at")?,
            subscription_tier: row.try_get("subscription_tier")?,
            plan_start: row.try_get("plan_start")?,
            plan_end: row.try_get("plan_end")?,
            phone_number: row.try_get("phone_number")?,
            preferred_language: row.try_get("preferred_language")?,
            company_profile: row.try_get("company_profile")?,
            total_transactions: row.try_get("total_transactions")?,
            total_revenue: row.try_get("total_revenue")?,
        })
    }
}

impl TryFromRow<PgRow> for MessageLogEntryModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let role: String = row.try_get("role")?;
        Ok(MessageLogEntryModel {
            id: row.try_get("id")?,
            account_id: AccountId::new(row.try_get::<String, _>("account_id")?),
            role: MessageRole::parse(&role).ok_or_else(|| format!("unknown message role '{role}'"))?,
            text: row.try_get("text")?,
            logical_ts: row.try_get("logical_ts")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
