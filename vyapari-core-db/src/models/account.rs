use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vyapari_core_api::domain::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "subscription_tier", rename_all = "lowercase"))]
pub enum SubscriptionTier {
    #[default]
    Free,
    Trial,
    Paid,
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "free"),
            SubscriptionTier::Trial => write!(f, "trial"),
            SubscriptionTier::Paid => write!(f, "paid"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionTier::Free),
            "trial" => Ok(SubscriptionTier::Trial),
            "paid" => Ok(SubscriptionTier::Paid),
            _ => Err(format!("Invalid SubscriptionTier: {s}")),
        }
    }
}

/// One end user of the bot, with rolling ledger aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountModel {
    pub account_id: AccountId,
    pub display_name: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub subscription_tier: SubscriptionTier,
    pub plan_start: Option<NaiveDate>,
    pub plan_end: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub preferred_language: Option<String>,
    pub company_profile: Option<String>,
    /// Only ever incremented
    pub total_transactions: i64,
    /// Sum of gross line totals; only ever incremented
    pub total_revenue: Decimal,
}

impl AccountModel {
    /// Account with default settings, as created on first contact.
    pub fn new(account_id: AccountId, display_name: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            display_name,
            registered_at: now,
            last_active_at: now,
            subscription_tier: SubscriptionTier::default(),
            plan_start: None,
            plan_end: None,
            phone_number: None,
            preferred_language: None,
            company_profile: None,
            total_transactions: 0,
            total_revenue: Decimal::ZERO,
        }
    }

    pub fn needs_phone_number(&self) -> bool {
        self.phone_number.as_deref().map_or(true, |p| p.trim().is_empty())
    }
}

/// Settings a user may change about their own account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountProfileUpdate {
    pub preferred_language: Option<String>,
    pub company_profile: Option<String>,
}
