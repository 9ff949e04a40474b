use async_trait::async_trait;
use vyapari_core_api::domain::AccountId;

use crate::utils::DayRange;

/// Repository trait for listing the invoices issued on one day
#[async_trait]
pub trait ListInvoiceNumbers: Send + Sync {
    /// List distinct invoice numbers whose invoice date falls in `day`
    ///
    /// # Arguments
    /// * `account_id` - The owning account
    /// * `day` - Half-open UTC day `[start, end)`
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Invoice numbers, newest first; empty when nothing was issued
    /// * `Err` - An error if the query could not be executed
    async fn list_invoice_numbers(
        &self,
        account_id: &AccountId,
        day: DayRange,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}
