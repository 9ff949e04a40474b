pub mod account_store;
pub mod delete_transaction;
pub mod invoice_number_exists;
pub mod list_invoice_dates;
pub mod list_invoice_numbers;
pub mod list_item_names;
pub mod message_log_store;
pub mod read_transactions;
pub mod repo_impl;
pub mod write_transaction;

#[cfg(test)]
pub mod test_utils;

pub use repo_impl::LedgerRepositoryImpl;
