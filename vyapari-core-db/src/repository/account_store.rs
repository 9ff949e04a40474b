use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vyapari_core_api::domain::AccountId;

use crate::models::account::{AccountModel, AccountProfileUpdate};

/// Repository trait for the account registry
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create the account on first contact, otherwise refresh
    /// `last_active_at` and, when given, the display name
    ///
    /// # Returns
    /// * `Ok((AccountModel, bool))` - The account and whether it was just created
    async fn touch_account(
        &self,
        account_id: &AccountId,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(AccountModel, bool), Box<dyn std::error::Error + Send + Sync>>;

    async fn find_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<AccountModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// # Returns
    /// * `Ok(false)` - The account does not exist
    async fn set_phone_number(
        &self,
        account_id: &AccountId,
        phone_number: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Apply the `Some` fields of `update`
    ///
    /// # Returns
    /// * `Ok(false)` - The account does not exist
    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &AccountProfileUpdate,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
