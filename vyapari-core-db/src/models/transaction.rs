use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vyapari_core_api::domain::{AccountId, InvoiceDocument, InvoiceLine, PaymentMethod};

use super::identifiable::Identifiable;

/// One persisted invoice line.
///
/// Field names double as the CSV export header, so renaming a field changes
/// the export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionModel {
    pub id: Uuid,
    pub account_id: AccountId,
    pub item_name: String,
    pub item_code: Option<String>,
    pub quantity: i32,
    /// GST-inclusive price per unit before discount
    pub unit_price: Decimal,
    /// Combined CGST + SGST + IGST percentage
    pub tax_rate: Decimal,
    pub discount_per_unit: Decimal,
    pub invoice_date: NaiveDate,
    pub invoice_number: String,
    pub payment_method: PaymentMethod,
    pub currency: String,
    pub customer_name: Option<String>,
    pub customer_details: Option<String>,
    pub raw_message: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionModel {
    /// Build the ledger row for one line of a composed invoice.
    pub fn from_invoice_line(
        document: &InvoiceDocument,
        line: &InvoiceLine,
        raw_message: &str,
        currency: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        let buyer = document.buyer.as_ref();
        Self {
            id: Uuid::new_v4(),
            account_id: document.account_id.clone(),
            item_name: line.item_name.clone(),
            item_code: line.item_code.clone(),
            // Composer caps quantities at i32::MAX.
            quantity: i32::try_from(line.quantity).unwrap_or(i32::MAX),
            unit_price: line.unit_rate,
            tax_rate: document.tax_rates.combined(),
            discount_per_unit: line.discount,
            invoice_date: document.invoice_date,
            invoice_number: document.invoice_number.clone(),
            payment_method: document.payment_method,
            currency: currency.to_string(),
            customer_name: buyer.and_then(|b| b.name.clone()),
            customer_details: buyer.and_then(|b| b.details.clone().or_else(|| b.phone.clone())),
            raw_message: raw_message.to_string(),
            created_at,
        }
    }

    /// Tax-inclusive line total after discount.
    pub fn gross_total(&self) -> Decimal {
        (self.unit_price - self.discount_per_unit) * Decimal::from(self.quantity)
    }
}

impl Identifiable for TransactionModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use vyapari_core_api::domain::{InvoiceComposer, InvoiceRequest, PartyDetails, TaxRates};

    #[test]
    fn builds_rows_from_document_lines() {
        let mut request = InvoiceRequest::new(
            AccountId::from(42i64),
            vec!["tea".into(), "sugar".into()],
            vec![5, 2],
            vec![dec!(20.0), dec!(45.0)],
        );
        request.tax_rates = TaxRates::intra_state(dec!(18)).unwrap();
        request.discounts = vec![dec!(1)];
        request.customer = Some(PartyDetails {
            name: Some("Ramesh".into()),
            phone: Some("9876543210".into()),
            ..PartyDetails::default()
        });
        let issued_at = Utc.with_ymd_and_hms(2025, 7, 5, 9, 15, 0).unwrap();
        let document = InvoiceComposer::default().compose(&request, issued_at).unwrap();

        let rows: Vec<TransactionModel> = document
            .lines
            .iter()
            .map(|line| TransactionModel::from_invoice_line(&document, line, "sold tea", "INR", issued_at))
            .collect();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.invoice_number == document.invoice_number));
        assert_eq!(rows[0].tax_rate, dec!(18));
        assert_eq!(rows[0].gross_total(), dec!(95.0));
        assert_eq!(rows[1].gross_total(), dec!(90.0));
        assert_eq!(rows[0].customer_name.as_deref(), Some("Ramesh"));
        assert_eq!(rows[0].customer_details.as_deref(), Some("9876543210"));
        assert_ne!(rows[0].get_id(), rows[1].get_id());
    }
}
