//! Callback tokens of the deletion wizard.
//!
//! Tokens are ASCII, pipe-delimited, case-sensitive and at most 64 bytes:
//!
//! ```text
//! del_menu
//! del_recent
//! del_search
//! del_date|<yyyy-mm-dd>
//! del_inv|<yyyy-mm-dd>|<invoice>
//! del_item|<invoice>|<item>
//! del_cancel|<root|date|inv>
//! ```
//!
//! An `<invoice>` or `<item>` that cannot travel verbatim (too long, non-ASCII,
//! contains `|`) is replaced by a reference into the wizard session: `#<n>`
//! is the n-th entry of the list the session last showed, `~` is the invoice
//! currently selected in the session.

use std::fmt::Write as _;

use chrono::NaiveDate;
use heapless::String as HeaplessString;
use thiserror::Error;

pub const MAX_TOKEN_BYTES: usize = 64;

pub type TokenString = HeaplessString<MAX_TOKEN_BYTES>;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("callback token exceeds {MAX_TOKEN_BYTES} bytes")]
    TooLong,
    #[error("value cannot be embedded in a callback token: {0}")]
    UnsafeValue(String),
}

impl From<TokenError> for crate::error::ApiError {
    fn from(e: TokenError) -> Self {
        crate::error::ApiError::InternalError(e.to_string())
    }
}

/// An invoice number or item name carried by a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRef {
    Value(String),
    /// 0-based index into the list the session last showed.
    Listed(usize),
    /// The invoice currently selected in the session.
    Selected,
}

impl ListRef {
    /// Whether `value` can travel verbatim.
    pub fn is_embeddable(value: &str) -> bool {
        !value.is_empty()
            && value.is_ascii()
            && !value.contains('|')
            && !value.starts_with('#')
            && value != "~"
    }

    fn parse(param: &str) -> Option<Self> {
        if param == "~" {
            return Some(ListRef::Selected);
        }
        if let Some(index) = param.strip_prefix('#') {
            return index.parse().ok().map(ListRef::Listed);
        }
        if param.is_empty() {
            return None;
        }
        Some(ListRef::Value(param.to_string()))
    }

    fn write_to(&self, out: &mut String) -> Result<(), TokenError> {
        match self {
            ListRef::Value(value) if Self::is_embeddable(value) => out.push_str(value),
            ListRef::Value(value) => return Err(TokenError::UnsafeValue(value.clone())),
            ListRef::Listed(index) => {
                let _ = write!(out, "#{index}");
            }
            ListRef::Selected => out.push('~'),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelLevel {
    Root,
    Date,
    Invoice,
}

impl CancelLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelLevel::Root => "root",
            CancelLevel::Date => "date",
            CancelLevel::Invoice => "inv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackToken {
    Menu,
    Recent,
    Search,
    Date(NaiveDate),
    Invoice { date: NaiveDate, invoice: ListRef },
    Item { invoice: ListRef, item: ListRef },
    Cancel(CancelLevel),
}

impl CallbackToken {
    /// Parse inbound callback data. Unknown or malformed tokens yield `None`
    /// and are ignored by the wizard.
    pub fn parse(data: &str) -> Option<Self> {
        if data.len() > MAX_TOKEN_BYTES || !data.is_ascii() {
            return None;
        }
        let mut parts = data.split('|');
        let action = parts.next()?;
        let params: Vec<&str> = parts.collect();

        let token = match (action, params.as_slice()) {
            ("del_menu", []) => CallbackToken::Menu,
            ("del_recent", []) => CallbackToken::Recent,
            ("del_search", []) => CallbackToken::Search,
            ("del_date", [date]) => CallbackToken::Date(parse_date(date)?),
            ("del_inv", [date, invoice]) => CallbackToken::Invoice {
                date: parse_date(date)?,
                invoice: ListRef::parse(invoice)?,
            },
            ("del_item", [invoice, item]) => CallbackToken::Item {
                invoice: ListRef::parse(invoice)?,
                item: ListRef::parse(item)?,
            },
            ("del_cancel", [level]) => CallbackToken::Cancel(match *level {
                "date" => CancelLevel::Date,
                "inv" => CancelLevel::Invoice,
                _ => CancelLevel::Root,
            }),
            _ => return None,
        };
        Some(token)
    }

    pub fn encode(&self) -> Result<TokenString, TokenError> {
        let mut out = String::with_capacity(MAX_TOKEN_BYTES);
        match self {
            CallbackToken::Menu => out.push_str("del_menu"),
            CallbackToken::Recent => out.push_str("del_recent"),
            CallbackToken::Search => out.push_str("del_search"),
            CallbackToken::Date(date) => {
                let _ = write!(out, "del_date|{}", date.format(DATE_FORMAT));
            }
            CallbackToken::Invoice { date, invoice } => {
                let _ = write!(out, "del_inv|{}|", date.format(DATE_FORMAT));
                invoice.write_to(&mut out)?;
            }
            CallbackToken::Item { invoice, item } => {
                out.push_str("del_item|");
                invoice.write_to(&mut out)?;
                out.push('|');
                item.write_to(&mut out)?;
            }
            CallbackToken::Cancel(level) => {
                let _ = write!(out, "del_cancel|{}", level.as_str());
            }
        }
        HeaplessString::try_from(out.as_str()).map_err(|_| TokenError::TooLong)
    }
}

fn parse_date(param: &str) -> Option<NaiveDate> {
    // Older menus carried a full ISO timestamp; only the date part matters.
    let day = param.get(..10)?;
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

/// Build a `del_inv` token, falling back to a list reference when the
/// invoice number cannot travel verbatim.
pub fn invoice_token(date: NaiveDate, invoice: &str, listed_at: usize) -> Result<TokenString, TokenError> {
    CallbackToken::Invoice {
        date,
        invoice: ListRef::Value(invoice.to_string()),
    }
    .encode()
    .or_else(|_| {
        CallbackToken::Invoice {
            date,
            invoice: ListRef::Listed(listed_at),
        }
        .encode()
    })
}

/// Build a `del_item` token, preferring verbatim values and degrading to
/// session references until the token fits.
pub fn item_token(invoice: &str, item: &str, listed_at: usize) -> Result<TokenString, TokenError> {
    let candidates = [
        (ListRef::Value(invoice.to_string()), ListRef::Value(item.to_string())),
        (ListRef::Value(invoice.to_string()), ListRef::Listed(listed_at)),
        (ListRef::Selected, ListRef::Value(item.to_string())),
        (ListRef::Selected, ListRef::Listed(listed_at)),
    ];
    let mut last_err = TokenError::TooLong;
    for (invoice, item) in candidates {
        match (CallbackToken::Item { invoice, item }).encode() {
            Ok(token) => return Ok(token),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}
