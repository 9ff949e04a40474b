use std::fmt::Write as _;

use crate::domain::tax::round_money;
use crate::domain::{InvoiceDocument, PartyDetails};
use crate::error::ApiResult;
use crate::service::transport::OutboundDocument;

/// Turns a composed invoice into a deliverable file.
///
/// Rendering is synchronous and may be slow (PDF layout), so callers run it
/// on the blocking pool rather than on the request scheduler.
pub trait DocumentRenderer: Send + Sync + 'static {
    fn render(&self, document: &InvoiceDocument) -> ApiResult<OutboundDocument>;
}

/// Fixed-width text rendering, used where no PDF engine is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

fn write_party(out: &mut String, heading: &str, party: Option<&PartyDetails>) {
    let Some(party) = party else { return };
    let _ = writeln!(out, "{heading}:");
    let fields = [
        ("Name", &party.name),
        ("Address", &party.address),
        ("City", &party.city),
        ("Phone", &party.phone),
        ("Email", &party.email),
        ("GSTIN", &party.gstin),
        ("PAN", &party.pan),
        ("Details", &party.details),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "  {label}: {value}");
        }
    }
}

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, document: &InvoiceDocument) -> ApiResult<OutboundDocument> {
        let mut out = String::new();
        let _ = writeln!(out, "TAX INVOICE");
        let _ = writeln!(out, "Invoice Number: {}", document.invoice_number);
        let _ = writeln!(out, "Date: {}", document.invoice_date.format("%Y-%m-%d"));
        let _ = writeln!(out, "Payment: {}", document.payment_method);
        write_party(&mut out, "Seller", document.seller.as_ref());
        write_party(&mut out, "Buyer", document.buyer.as_ref());
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<4}{:<24}{:>6}{:>12}{:>12}{:>12}",
            "#", "Item", "Qty", "Rate", "Taxable", "Total"
        );
        for line in &document.lines {
            let _ = writeln!(
                out,
                "{:<4}{:<24}{:>6}{:>12}{:>12}{:>12}",
                line.position,
                line.item_name,
                line.quantity,
                round_money(line.amounts.effective_rate),
                round_money(line.amounts.base_total),
                round_money(line.amounts.gross_total),
            );
        }
        let totals = document.totals.rounded();
        let _ = writeln!(out);
        let _ = writeln!(out, "Taxable Value: {}", totals.base_total);
        if !document.tax_rates.cgst.is_zero() {
            let _ = writeln!(out, "CGST @ {}%: {}", document.tax_rates.cgst, totals.cgst_amount);
        }
        if !document.tax_rates.sgst.is_zero() {
            let _ = writeln!(out, "SGST @ {}%: {}", document.tax_rates.sgst, totals.sgst_amount);
        }
        if !document.tax_rates.igst.is_zero() {
            let _ = writeln!(out, "IGST @ {}%: {}", document.tax_rates.igst, totals.igst_amount);
        }
        let _ = writeln!(out, "Total Amount: {}", totals.gross_total);
        let _ = writeln!(out, "{}", document.amount_in_words);

        Ok(OutboundDocument {
            file_name: format!("{}.txt", document.file_stem()),
            mime_type: "text/plain",
            bytes: out.into_bytes(),
            caption: Some(format!("Invoice {}", document.invoice_number)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, InvoiceComposer, InvoiceRequest, TaxRates};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn renders_totals_and_words() {
        let mut request = InvoiceRequest::new(
            AccountId::from(42i64),
            vec!["tea".into(), "sugar".into()],
            vec![5, 2],
            vec![dec!(20.0), dec!(45.0)],
        );
        request.tax_rates = TaxRates::intra_state(dec!(18)).unwrap();
        request.invoice_number = Some("INV_42/2025-07/050915-00AF".into());
        let issued_at = Utc.with_ymd_and_hms(2025, 7, 5, 9, 15, 0).unwrap();
        let document = InvoiceComposer::default().compose(&request, issued_at).unwrap();

        let rendered = PlainTextRenderer.render(&document).unwrap();
        let text = String::from_utf8(rendered.bytes).unwrap();
        assert_eq!(rendered.file_name, "invoice_INV_42_2025-07_050915-00AF.txt");
        assert!(text.contains("Total Amount: 190.00"));
        assert!(text.contains("CGST @ 9%"));
        assert!(!text.contains("IGST"));
        assert!(text.contains("One Hundred Ninety Rupees Only"));
        assert!(!text.contains("Buyer:"));
    }
}
