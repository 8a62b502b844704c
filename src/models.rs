use chrono::FixedOffset;
use thiserror::Error;

pub mod deposits;
pub mod earnings;
pub mod ledger;
pub mod levels;
pub mod referrals;
pub mod users;
pub mod withdrawals;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Request is not pending")]
    InvalidTransition,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Amount is below the allowed minimum")]
    BelowMinimumAmount,
    #[error("A pending request already exists for today")]
    DuplicatePendingRequest,
    #[error("Requests are not accepted at this time")]
    OutsideAllowedWindow,
    #[error("No active level")]
    NoActiveLevel,
    #[error("Daily earning already claimed")]
    AlreadyClaimed,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Fixed offset used to interpret "today" and the withdrawal window.
/// The hour value is validated when settings are loaded.
pub fn platform_offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).expect("utc offset hours in range")
}
