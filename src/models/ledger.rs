use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The single balance-and-state record owned by one user. Created at
/// registration, mutated only by the deposit, withdrawal and earnings
/// operations.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct LedgerAccount {
    pub user_id: String,
    pub balance: Decimal,
    pub subsidy_balance: Decimal,
    pub total_deposited: Decimal,
    pub total_withdrawn: Decimal,
    pub active_level_id: Option<i32>,
    pub level_activated_at: Option<DateTime<Utc>>,
    pub last_deposit_approved_at: Option<DateTime<Utc>>,
    pub last_withdrawal_requested_at: Option<DateTime<Utc>>,
    pub bank_name: Option<String>,
    pub iban: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub iban: String,
}
