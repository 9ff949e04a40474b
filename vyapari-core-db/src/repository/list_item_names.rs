use async_trait::async_trait;
use vyapari_core_api::domain::AccountId;

/// Repository trait for listing the items of one invoice
#[async_trait]
pub trait ListItemNames: Send + Sync {
    /// List distinct item names recorded under `invoice_number`
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Item names in insertion order; empty for an unknown invoice
    /// * `Err` - An error if the query could not be executed
    async fn list_item_names(
        &self,
        account_id: &AccountId,
        invoice_number: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}
