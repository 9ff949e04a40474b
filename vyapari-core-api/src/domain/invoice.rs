//! Invoice composition: validated tool-call arguments in, priced document out.
//!
//! Composition has no side effects. Persisting the lines is a separate step
//! so that a rendering failure never leaves partial ledger rows behind.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::account_id::AccountId;
use super::invoice_number::InvoiceNumberGenerator;
use super::payment::PaymentMethod;
use super::tax::{decompose_line, InvoiceTotals, LineAmounts, TaxRates};
use super::words::amount_in_words;
use crate::error::ValidationError;

/// Seller or buyer block printed on the invoice.
///
/// Every field is optional: absent values stay absent instead of being
/// replaced by placeholder text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PartyDetails {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub city: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(equal = 15))]
    pub gstin: Option<String>,
    #[validate(length(equal = 10))]
    pub pan: Option<String>,
    /// Free-text contact details (phone, address) as the user typed them.
    #[validate(length(max = 1000))]
    pub details: Option<String>,
}

impl PartyDetails {
    pub fn is_empty(&self) -> bool {
        *self == PartyDetails::default()
    }
}

/// Arguments of the `generate_invoice` tool call.
///
/// `item_names`, `quantities` and `unit_rates` are parallel lists of equal
/// length. `discounts` and `item_codes` may be shorter; missing entries are
/// treated as zero discount and no code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub account_id: AccountId,
    pub item_names: Vec<String>,
    pub quantities: Vec<i64>,
    pub unit_rates: Vec<Decimal>,
    /// Invoice date; today (UTC) when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// The user's original message, kept for audit.
    #[serde(default)]
    pub raw_message: String,
    #[serde(default)]
    pub discounts: Vec<Decimal>,
    #[serde(default)]
    pub item_codes: Vec<String>,
    #[serde(default)]
    pub tax_rates: TaxRates,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub company: Option<PartyDetails>,
    #[serde(default)]
    pub customer: Option<PartyDetails>,
}

impl InvoiceRequest {
    /// Minimal request with the three required parallel lists.
    pub fn new(
        account_id: AccountId,
        item_names: Vec<String>,
        quantities: Vec<i64>,
        unit_rates: Vec<Decimal>,
    ) -> Self {
        Self {
            account_id,
            item_names,
            quantities,
            unit_rates,
            date: None,
            raw_message: String::new(),
            discounts: Vec::new(),
            item_codes: Vec::new(),
            tax_rates: TaxRates::default(),
            payment_method: None,
            invoice_number: None,
            company: None,
            customer: None,
        }
    }
}

/// One validated line before pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInput {
    pub item_name: String,
    pub item_code: Option<String>,
    pub quantity: u32,
    pub unit_rate: Decimal,
    pub discount: Decimal,
}

fn length_mismatch(field: &'static str, expected: usize, got: usize) -> ValidationError {
    ValidationError::new(field, format!("expected {expected} entries to match item_names, got {got}"))
}

fn party_error(field: &'static str, errors: validator::ValidationErrors) -> ValidationError {
    ValidationError::new(field, errors.to_string())
}

/// Check every argument and return the normalised lines.
///
/// Positions in errors are 1-based to match what users see on the invoice.
pub fn validate_request(request: &InvoiceRequest) -> Result<Vec<LineInput>, ValidationError> {
    let count = request.item_names.len();
    if count == 0 {
        return Err(ValidationError::new("item_names", "at least one item is required"));
    }
    if request.quantities.len() != count {
        return Err(length_mismatch("quantities", count, request.quantities.len()));
    }
    if request.unit_rates.len() != count {
        return Err(length_mismatch("unit_rates", count, request.unit_rates.len()));
    }
    if request.discounts.len() > count {
        return Err(length_mismatch("discounts", count, request.discounts.len()));
    }
    if request.item_codes.len() > count {
        return Err(length_mismatch("item_codes", count, request.item_codes.len()));
    }
    request.tax_rates.validate()?;
    if let Some(company) = &request.company {
        company.validate().map_err(|e| party_error("company", e))?;
    }
    if let Some(customer) = &request.customer {
        customer.validate().map_err(|e| party_error("customer", e))?;
    }

    let mut lines = Vec::with_capacity(count);
    for index in 0..count {
        let position = index + 1;

        let item_name = request.item_names[index].trim();
        if item_name.is_empty() {
            return Err(ValidationError::at("item_name", position, "must not be empty"));
        }

        let quantity = request.quantities[index];
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0 && *q <= i32::MAX as u32)
            .ok_or_else(|| ValidationError::at("quantity", position, "must be a positive integer"))?;

        let unit_rate = request.unit_rates[index];
        if unit_rate <= Decimal::ZERO {
            return Err(ValidationError::at("unit_rate", position, "must be greater than zero"));
        }

        let discount = request.discounts.get(index).copied().unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO {
            return Err(ValidationError::at("discount", position, "cannot be negative"));
        }
        if discount > unit_rate {
            return Err(ValidationError::at("discount", position, "cannot exceed the unit rate"));
        }

        let item_code = request
            .item_codes
            .get(index)
            .map(|code| code.trim())
            .filter(|code| !code.is_empty())
            .map(str::to_string);

        lines.push(LineInput {
            item_name: item_name.to_string(),
            item_code,
            quantity,
            unit_rate,
            discount,
        });
    }
    Ok(lines)
}

/// A priced line on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub position: usize,
    pub item_name: String,
    pub item_code: Option<String>,
    pub quantity: u32,
    pub unit_rate: Decimal,
    pub discount: Decimal,
    pub amounts: LineAmounts,
}

/// Renderable invoice, handed to a document renderer and to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub account_id: AccountId,
    pub invoice_date: NaiveDate,
    pub issued_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub tax_rates: TaxRates,
    pub seller: Option<PartyDetails>,
    pub buyer: Option<PartyDetails>,
    pub lines: Vec<InvoiceLine>,
    pub totals: InvoiceTotals,
    pub amount_in_words: String,
}

impl InvoiceDocument {
    /// File-system friendly stem, e.g. `invoice_INV_42_2025-07_051430-0A1B`.
    pub fn file_stem(&self) -> String {
        let sanitized: String = self
            .invoice_number
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("invoice_{sanitized}")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceComposer {
    numbers: InvoiceNumberGenerator,
}

impl InvoiceComposer {
    pub fn new(numbers: InvoiceNumberGenerator) -> Self {
        Self { numbers }
    }

    pub fn numbers(&self) -> &InvoiceNumberGenerator {
        &self.numbers
    }

    /// Compose using the caller's invoice number, or a freshly generated one.
    pub fn compose(
        &self,
        request: &InvoiceRequest,
        issued_at: DateTime<Utc>,
    ) -> Result<InvoiceDocument, ValidationError> {
        let number = match request.invoice_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => number.to_string(),
            _ => self.numbers.generate(&request.account_id, issued_at),
        };
        self.compose_numbered(request, issued_at, number)
    }

    pub fn compose_numbered(
        &self,
        request: &InvoiceRequest,
        issued_at: DateTime<Utc>,
        invoice_number: String,
    ) -> Result<InvoiceDocument, ValidationError> {
        let inputs = validate_request(request)?;

        let mut lines = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let amounts = decompose_line(input.unit_rate, input.discount, input.quantity, &request.tax_rates)
                .map_err(|e| ValidationError::at(e.field, index + 1, e.reason))?;
            lines.push(InvoiceLine {
                position: index + 1,
                item_name: input.item_name,
                item_code: input.item_code,
                quantity: input.quantity,
                unit_rate: input.unit_rate,
                discount: input.discount,
                amounts,
            });
        }

        let totals: InvoiceTotals = lines.iter().map(|line| &line.amounts).collect();

        Ok(InvoiceDocument {
            invoice_number,
            account_id: request.account_id.clone(),
            invoice_date: request.date.unwrap_or_else(|| issued_at.date_naive()),
            issued_at,
            payment_method: request.payment_method.unwrap_or_default(),
            tax_rates: request.tax_rates,
            seller: request.company.clone().filter(|p| !p.is_empty()),
            buyer: request.customer.clone().filter(|p| !p.is_empty()),
            amount_in_words: amount_in_words(totals.gross_total),
            lines,
            totals,
        })
    }
}
