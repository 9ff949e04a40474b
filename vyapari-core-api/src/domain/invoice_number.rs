//! Invoice numbers of the form `INV_{account}/{yyyy-mm}/{ddHHMM}-{XXXX}`.
//!
//! The minute-resolution prefix alone collides when one account issues two
//! invoices in the same minute, so a random 16-bit hex suffix is appended.
//! Callers still check the ledger for an existing number and regenerate.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::account_id::AccountId;

pub const INVOICE_PREFIX: &str = "INV_";
const SUFFIX_LEN: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceNumberGenerator;

impl InvoiceNumberGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The visible, clock-derived part of the number.
    pub fn prefix(account_id: &AccountId, at: DateTime<Utc>) -> String {
        format!(
            "{INVOICE_PREFIX}{}/{}/{}",
            account_id,
            at.format("%Y-%m"),
            at.format("%d%H%M")
        )
    }

    pub fn generate(&self, account_id: &AccountId, at: DateTime<Utc>) -> String {
        self.generate_with(&mut rand::thread_rng(), account_id, at)
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        account_id: &AccountId,
        at: DateTime<Utc>,
    ) -> String {
        let suffix: u16 = rng.gen();
        format!(
            "{}-{:0width$X}",
            Self::prefix(account_id, at),
            suffix,
            width = SUFFIX_LEN
        )
    }
}

/// Whether free text looks like an invoice number a user copied from a document.
pub fn looks_like_invoice_number(text: &str) -> bool {
    let text = text.trim();
    text.len() > INVOICE_PREFIX.len()
        && text
            .get(..INVOICE_PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(INVOICE_PREFIX))
        && !text.contains(char::is_whitespace)
}
