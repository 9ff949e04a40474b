pub mod account_id;
pub mod callback;
pub mod invoice;
pub mod invoice_number;
pub mod menu;
pub mod payment;
pub mod tax;
pub mod words;

pub use account_id::AccountId;
pub use callback::{CallbackToken, CancelLevel, ListRef, TokenError, TokenString, MAX_TOKEN_BYTES};
pub use invoice::{
    validate_request, InvoiceComposer, InvoiceDocument, InvoiceLine, InvoiceRequest, LineInput, PartyDetails,
};
pub use invoice_number::{looks_like_invoice_number, InvoiceNumberGenerator, INVOICE_PREFIX};
pub use menu::{ButtonAction, Menu, MenuButton};
pub use payment::PaymentMethod;
pub use tax::{decompose_line, round_money, InvoiceTotals, LineAmounts, TaxRates};
pub use words::amount_in_words;
