pub mod account_store;
pub mod delete_transaction;
pub mod invoice_number_exists;
pub mod ledger_store;
pub mod list_invoice_dates;
pub mod list_invoice_numbers;
pub mod list_item_names;
pub mod message_log_store;
pub mod pagination;
pub mod rate_window_store;
pub mod read_transactions;
pub mod write_transaction;

// Re-exports
pub use account_store::*;
pub use delete_transaction::*;
pub use invoice_number_exists::*;
pub use ledger_store::*;
pub use list_invoice_dates::*;
pub use list_invoice_numbers::*;
pub use list_item_names::*;
pub use message_log_store::*;
pub use pagination::*;
pub use rate_window_store::*;
pub use read_transactions::*;
pub use write_transaction::*;

/// Result type shared by every store implementation.
pub type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
