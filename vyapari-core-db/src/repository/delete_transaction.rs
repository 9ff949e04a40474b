use async_trait::async_trait;
use vyapari_core_api::domain::AccountId;

/// Repository trait for removing one line item from the ledger
///
/// Account rollups are left untouched: they are running totals of what was
/// recorded, not of what remains.
#[async_trait]
pub trait DeleteTransaction: Send + Sync {
    /// Delete every row matching (account, invoice number, item name)
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows removed; `0` means nothing matched
    /// * `Err` - An error if the statement could not be executed
    async fn delete_transaction(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
        item_name: &str,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}
