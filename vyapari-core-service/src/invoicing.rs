//! Tool-call boundary: `generate_invoice` and `export_csv`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use vyapari_core_api::domain::tax::round_money;
use vyapari_core_api::domain::{validate_request, AccountId, InvoiceComposer, InvoiceDocument, InvoiceRequest};
use vyapari_core_api::error::{ApiError, ApiResult, ValidationError};
use vyapari_core_api::service::{send_text, ChatAction, ChatTransport, DocumentRenderer, OutboundDocument};

use crate::ledger::{CsvExport, TransactionLedger};
use crate::offload::BlockingCallOffload;

/// Generated numbers are retried this many times before giving up.
const MAX_NUMBER_ATTEMPTS: usize = 8;

const INVOICE_ACK: &str = "🧾 Generating your invoice, this may take a moment...";
const NO_TRANSACTIONS_TEXT: &str = "No transactions recorded yet.";

#[derive(Debug, Clone)]
pub struct InvoiceReceipt {
    pub invoice_number: String,
    pub document: InvoiceDocument,
    pub rows_written: usize,
    /// Whether the rendered document reached the user. Ledger rows are kept
    /// either way.
    pub delivered: bool,
}

/// An invoice whose rows are committed and whose document is ready to send.
struct Recorded {
    document: InvoiceDocument,
    rendered: OutboundDocument,
    rows_written: usize,
}

pub struct InvoiceService {
    composer: InvoiceComposer,
    ledger: Arc<TransactionLedger>,
    renderer: Arc<dyn DocumentRenderer>,
    transport: Arc<dyn ChatTransport>,
    offload: Arc<BlockingCallOffload>,
}

impl InvoiceService {
    pub fn new(
        composer: InvoiceComposer,
        ledger: Arc<TransactionLedger>,
        renderer: Arc<dyn DocumentRenderer>,
        transport: Arc<dyn ChatTransport>,
        offload: Arc<BlockingCallOffload>,
    ) -> Self {
        Self {
            composer,
            ledger,
            renderer,
            transport,
            offload,
        }
    }

    /// Compose, render, record and deliver one invoice.
    ///
    /// Arguments are validated before anything is sent or written. Rendering
    /// happens before the first ledger write; a failed write leaves the rows
    /// written so far in place. The overall timeout covers recording only:
    /// once the rows are committed the call succeeds, and a slow or failed
    /// delivery is reported through `delivered`.
    pub async fn generate_invoice(&self, request: InvoiceRequest) -> ApiResult<InvoiceReceipt> {
        validate_request(&request)?;
        let account_id = request.account_id.clone();

        let recorded = self
            .offload
            .with_progress(
                self.transport.clone(),
                &account_id,
                INVOICE_ACK,
                ChatAction::UploadDocument,
                self.record(&request),
            )
            .await?;
        let delivered = self
            .deliver(&account_id, &recorded.document.invoice_number, recorded.rendered)
            .await;

        info!(
            account_id = %account_id,
            invoice_number = %recorded.document.invoice_number,
            rows = recorded.rows_written,
            delivered,
            "invoice issued"
        );
        Ok(InvoiceReceipt {
            invoice_number: recorded.document.invoice_number.clone(),
            rows_written: recorded.rows_written,
            delivered,
            document: recorded.document,
        })
    }

    async fn record(&self, request: &InvoiceRequest) -> ApiResult<Recorded> {
        let account_id = &request.account_id;
        let _guard = self.ledger.lock_account(account_id).await;

        let issued_at = Utc::now();
        let document = self.compose_unique(request, issued_at).await?;

        let renderer = self.renderer.clone();
        let to_render = document.clone();
        let mut rendered = self.offload.run_blocking(move || renderer.render(&to_render)).await?;
        rendered.caption = Some(format!(
            "Invoice {}\nTotal: ₹{}",
            document.invoice_number,
            round_money(document.totals.gross_total)
        ));

        let rows = self.ledger.write_invoice(&document, &request.raw_message, issued_at).await?;
        Ok(Recorded {
            document,
            rendered,
            rows_written: rows.len(),
        })
    }

    /// Send the rendered invoice, bounded by the same timeout as recording.
    async fn deliver(&self, account_id: &AccountId, invoice_number: &str, rendered: OutboundDocument) -> bool {
        let upload = self.transport.send_document(account_id, rendered);
        match tokio::time::timeout(self.offload.timeout(), upload).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(
                    account_id = %account_id,
                    invoice_number,
                    error = %e,
                    "invoice recorded but not delivered"
                );
                false
            }
            Err(_) => {
                warn!(account_id = %account_id, invoice_number, "invoice recorded but delivery timed out");
                false
            }
        }
    }

    /// Compose with a number no existing invoice of the account uses.
    /// Caller-supplied numbers must be new; generated ones are retried.
    async fn compose_unique(&self, request: &InvoiceRequest, issued_at: DateTime<Utc>) -> ApiResult<InvoiceDocument> {
        let account_id = &request.account_id;
        if let Some(number) = request.invoice_number.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if self.ledger.invoice_number_exists(account_id, number).await? {
                return Err(ValidationError::new("invoice_number", format!("{number} is already used")).into());
            }
            return Ok(self.composer.compose_numbered(request, issued_at, number.to_string())?);
        }

        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let number = self.composer.numbers().generate(account_id, issued_at);
            if !self.ledger.invoice_number_exists(account_id, &number).await? {
                return Ok(self.composer.compose_numbered(request, issued_at, number)?);
            }
            warn!(account_id = %account_id, invoice_number = %number, "invoice number collision, regenerating");
        }
        Err(ApiError::InternalError(format!(
            "no unique invoice number after {MAX_NUMBER_ATTEMPTS} attempts"
        )))
    }

    /// Send the account's ledger as a CSV document. Returns the row count;
    /// an empty ledger gets a text reply instead of a file.
    pub async fn export_csv(&self, account_id: &AccountId) -> ApiResult<usize> {
        match self.ledger.export_csv(account_id).await? {
            CsvExport::NoData => {
                send_text(self.transport.as_ref(), account_id, NO_TRANSACTIONS_TEXT, None).await?;
                Ok(0)
            }
            CsvExport::Data { file_name, bytes, rows } => {
                let document = OutboundDocument {
                    file_name,
                    mime_type: "text/csv",
                    bytes,
                    caption: Some(format!("{rows} transactions")),
                };
                self.transport.send_document(account_id, document).await?;
                info!(account_id = %account_id, rows, "ledger exported");
                Ok(rows)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::tests::account;
    use crate::test_support::{RecordingTransport, Sent};
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use vyapari_core_api::domain::{InvoiceNumberGenerator, TaxRates};
    use vyapari_core_api::service::PlainTextRenderer;
    use vyapari_core_db::memory::MemoryLedgerStore;

    struct Fixture {
        service: InvoiceService,
        store: MemoryLedgerStore,
        transport: Arc<RecordingTransport>,
    }

    fn fixture() -> Fixture {
        fixture_with_timeout(Duration::from_secs(5))
    }

    fn fixture_with_timeout(timeout: Duration) -> Fixture {
        let store = MemoryLedgerStore::new();
        let transport = RecordingTransport::new();
        let ledger = Arc::new(TransactionLedger::new(Arc::new(store.clone()), "INR"));
        let offload = Arc::new(BlockingCallOffload::new(2, timeout, Duration::from_secs(1)));
        let service = InvoiceService::new(
            InvoiceComposer::new(InvoiceNumberGenerator::new()),
            ledger,
            Arc::new(PlainTextRenderer),
            transport.clone(),
            offload,
        );
        Fixture {
            service,
            store,
            transport,
        }
    }

    fn tea_and_sugar() -> InvoiceRequest {
        let mut request = InvoiceRequest::new(
            account(),
            vec!["tea".into(), "sugar".into()],
            vec![5, 2],
            vec![dec!(20.0), dec!(45.0)],
        );
        request.tax_rates = TaxRates::new(dec!(9), dec!(9), dec!(0)).unwrap();
        request.raw_message = "sold 5 tea at 20 and 2 sugar at 45".into();
        request
    }

    #[tokio::test]
    async fn issues_records_and_delivers() {
        let f = fixture();
        let receipt = tokio_test::assert_ok!(f.service.generate_invoice(tea_and_sugar()).await);

        assert_eq!(receipt.rows_written, 2);
        assert!(receipt.delivered);
        assert!(receipt.invoice_number.starts_with("INV_42/"));
        assert_eq!(round_money(receipt.document.totals.gross_total), dec!(190.00));
        assert_eq!(f.store.transaction_count(), 2);

        let sent = f.transport.sent();
        assert!(matches!(&sent[0], Sent::Message { text, .. } if text == INVOICE_ACK));

        let documents = f.transport.documents();
        assert_eq!(documents.len(), 1);
        let body = String::from_utf8(documents[0].bytes.clone()).unwrap();
        assert!(body.contains("Total Amount: 190.00"));
        assert!(documents[0].caption.as_deref().unwrap().ends_with("₹190.00"));
    }

    #[tokio::test]
    async fn length_mismatch_writes_nothing() {
        let f = fixture();
        let mut request = tea_and_sugar();
        request.quantities = vec![5];

        let err = f.service.generate_invoice(request).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref v) if v.field == "quantities"));
        assert_eq!(f.store.transaction_count(), 0);
        assert!(f.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_prefix_and_skips_delivery() {
        let f = fixture();
        f.store.fail_writes_after(Some(1));

        let err = f.service.generate_invoice(tea_and_sugar()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(f.store.transaction_count(), 1);
        assert!(f.transport.documents().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_keeps_rows() {
        let f = fixture();
        f.transport.fail_documents(true);

        let receipt = tokio_test::assert_ok!(f.service.generate_invoice(tea_and_sugar()).await);
        assert!(!receipt.delivered);
        assert_eq!(f.store.transaction_count(), 2);
    }

    #[tokio::test]
    async fn slow_delivery_after_recording_is_not_a_timeout() {
        let f = fixture_with_timeout(Duration::from_millis(300));
        f.transport.delay_documents(Some(Duration::from_millis(900)));

        let receipt = tokio_test::assert_ok!(f.service.generate_invoice(tea_and_sugar()).await);
        assert!(!receipt.delivered);
        assert_eq!(receipt.rows_written, 2);
        assert_eq!(f.store.transaction_count(), 2);
    }

    #[tokio::test]
    async fn caller_numbers_must_be_new() {
        let f = fixture();
        let mut request = tea_and_sugar();
        request.invoice_number = Some("INV_42/CUSTOM-1".into());

        let receipt = f.service.generate_invoice(request.clone()).await.unwrap();
        assert_eq!(receipt.invoice_number, "INV_42/CUSTOM-1");

        let err = f.service.generate_invoice(request).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref v) if v.field == "invoice_number"));
        assert_eq!(f.store.transaction_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_invoices_get_distinct_numbers() {
        let f = Arc::new(fixture());
        let calls = (0..4).map(|_| {
            let f = f.clone();
            tokio::spawn(async move { f.service.generate_invoice(tea_and_sugar()).await })
        });
        let mut numbers = Vec::new();
        for call in calls.collect::<Vec<_>>() {
            numbers.push(call.await.unwrap().unwrap().invoice_number);
        }
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 4);
        assert_eq!(f.store.transaction_count(), 8);
    }

    #[tokio::test]
    async fn csv_export_sends_file_or_notice() {
        let f = fixture();
        assert_eq!(f.service.export_csv(&account()).await.unwrap(), 0);
        assert_eq!(f.transport.texts(), vec![NO_TRANSACTIONS_TEXT.to_string()]);

        f.service.generate_invoice(tea_and_sugar()).await.unwrap();
        assert_eq!(f.service.export_csv(&account()).await.unwrap(), 2);

        let csv = f.transport.documents().pop().unwrap();
        assert_eq!(csv.file_name, "transactions_42.csv");
        assert_eq!(csv.mime_type, "text/csv");
    }
}
