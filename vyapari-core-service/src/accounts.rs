use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use vyapari_core_api::domain::AccountId;
use vyapari_core_api::error::{ApiError, ApiResult, ValidationError};
use vyapari_core_db::models::{AccountModel, AccountProfileUpdate};
use vyapari_core_db::repository::{AccountStore, LedgerStore};

use crate::ledger::storage_failure;

/// Account registry: first-contact creation, activity refresh and the
/// user-editable profile fields.
#[derive(Clone)]
pub struct AccountRegistry {
    store: Arc<dyn LedgerStore>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Called on every inbound request from an identified account.
    pub async fn touch(&self, account_id: &AccountId, display_name: Option<&str>) -> ApiResult<AccountModel> {
        let (account, created) = self
            .store
            .touch_account(account_id, display_name, Utc::now())
            .await
            .map_err(storage_failure("touch_account", account_id))?;
        if created {
            info!(account_id = %account_id, "account registered");
        }
        Ok(account)
    }

    pub async fn find(&self, account_id: &AccountId) -> ApiResult<Option<AccountModel>> {
        self.store
            .find_account(account_id)
            .await
            .map_err(storage_failure("find_account", account_id))
    }

    pub async fn needs_phone_number(&self, account_id: &AccountId) -> ApiResult<bool> {
        Ok(self.find(account_id).await?.map_or(true, |a| a.needs_phone_number()))
    }

    /// Store the number the user shared. Returns `false` for unknown accounts.
    pub async fn record_phone_number(&self, account_id: &AccountId, phone_number: &str) -> ApiResult<bool> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(ValidationError::new("phone_number", "must not be empty").into());
        }
        let updated = self
            .store
            .set_phone_number(account_id, phone_number)
            .await
            .map_err(storage_failure("set_phone_number", account_id))?;
        if updated {
            info!(account_id = %account_id, "phone number recorded");
        }
        Ok(updated)
    }

    /// Apply the set fields of `update`. Unknown accounts are `NotFound`.
    pub async fn update_profile(&self, account_id: &AccountId, update: &AccountProfileUpdate) -> ApiResult<()> {
        let updated = self
            .store
            .update_profile(account_id, update)
            .await
            .map_err(storage_failure("update_profile", account_id))?;
        if !updated {
            return Err(ApiError::NotFound(format!("account {account_id}")));
        }
        Ok(())
    }
}
