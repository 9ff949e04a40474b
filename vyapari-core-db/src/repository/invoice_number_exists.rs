use async_trait::async_trait;
use vyapari_core_api::domain::AccountId;

/// Repository trait for checking whether an invoice number is taken
#[async_trait]
pub trait InvoiceNumberExists: Send + Sync {
    /// # Returns
    /// * `Ok(true)` - At least one row of the account carries `invoice_number`
    /// * `Err` - An error if the query could not be executed
    async fn invoice_number_exists(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
