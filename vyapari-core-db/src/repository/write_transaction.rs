use async_trait::async_trait;

use crate::models::transaction::TransactionModel;

/// Repository trait for appending one line to the transaction ledger
///
/// Each call inserts exactly one row and, in the same unit of work, creates
/// the owning account if it does not exist and increments its rollup
/// (`total_transactions += 1`, `total_revenue += gross_total`).
///
/// # Example
/// ```ignore
/// impl WriteTransaction for TransactionRepositoryImpl {
///     async fn write_transaction(&self, item: TransactionModel) -> Result<TransactionModel, Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait WriteTransaction: Send + Sync {
    /// Insert one row and update the account rollup atomically
    ///
    /// # Arguments
    /// * `item` - The ledger row to insert
    ///
    /// # Returns
    /// * `Ok(TransactionModel)` - The stored row
    /// * `Err` - The store was unavailable; nothing was written
    async fn write_transaction(
        &self,
        item: TransactionModel,
    ) -> Result<TransactionModel, Box<dyn std::error::Error + Send + Sync>>;
}
