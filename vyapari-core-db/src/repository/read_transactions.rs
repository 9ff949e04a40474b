use async_trait::async_trait;
use vyapari_core_api::domain::AccountId;

use crate::models::transaction::TransactionModel;

/// Repository trait for reading every ledger row of an account
#[async_trait]
pub trait ReadTransactions: Send + Sync {
    /// Load all rows for the account, oldest first
    ///
    /// # Arguments
    /// * `account_id` - The owning account
    ///
    /// # Returns
    /// * `Ok(Vec<TransactionModel>)` - Possibly empty
    /// * `Err` - An error if the query could not be executed
    async fn read_transactions(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TransactionModel>, Box<dyn std::error::Error + Send + Sync>>;
}
