use async_trait::async_trait;
use chrono::NaiveDate;
use vyapari_core_api::domain::AccountId;

use super::pagination::{Page, PageRequest};

/// Repository trait for listing the distinct invoice dates of an account
#[async_trait]
pub trait ListInvoiceDates: Send + Sync {
    /// List distinct invoice dates, newest first
    ///
    /// # Arguments
    /// * `account_id` - The owning account
    /// * `page` - Window into the listing; `PageRequest::first(n)` caps it at `n`
    ///
    /// # Returns
    /// * `Ok(Page<NaiveDate>)` - The requested dates and the total number of distinct dates
    /// * `Err` - An error if the query could not be executed
    async fn list_invoice_dates(
        &self,
        account_id: &AccountId,
        page: PageRequest,
    ) -> Result<Page<NaiveDate>, Box<dyn std::error::Error + Send + Sync>>;
}
