use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LedgerError, RequestStatus};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Deposit {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub proof_reference: Option<String>,
    pub bank_account_id: Option<String>,
    pub level_id: Option<i32>,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewDeposit {
    pub user_id: String,
    pub amount: Decimal,
    pub proof_reference: Option<String>,
    pub bank_account_id: Option<String>,
    pub level_id: Option<i32>,
}

/// A platform coordinate the user transfers into.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    pub holder_name: String,
    pub iban: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Deposit {
    pub fn ensure_pending(&self) -> Result<(), LedgerError> {
        if self.status == RequestStatus::Pending.as_str() {
            Ok(())
        } else {
            Err(LedgerError::InvalidTransition)
        }
    }

    /// The target level activates only when it differs from the current one
    /// or when there is no current level.
    pub fn activates_level(&self, current: Option<i32>) -> Option<i32> {
        match self.level_id {
            Some(target) if current != Some(target) => Some(target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn deposit(status: RequestStatus, level_id: Option<i32>) -> Deposit {
        Deposit {
            id: "d-1".to_string(),
            user_id: "u-1".to_string(),
            amount: Decimal::new(500000, 2),
            proof_reference: None,
            bank_account_id: None,
            level_id,
            status: status.as_str().to_string(),
            requested_at: Utc.with_ymd_and_hms(2025, 8, 5, 10, 0, 0).unwrap(),
            approved_at: None,
        }
    }

    #[test]
    fn test_pending_deposit_passes_guard() {
        assert!(deposit(RequestStatus::Pending, None).ensure_pending().is_ok());
    }

    #[test]
    fn test_decided_deposit_fails_guard() {
        let approved = deposit(RequestStatus::Approved, None);
        assert!(matches!(
            approved.ensure_pending(),
            Err(LedgerError::InvalidTransition)
        ));
        let rejected = deposit(RequestStatus::Rejected, None);
        assert!(matches!(
            rejected.ensure_pending(),
            Err(LedgerError::InvalidTransition)
        ));
    }

    #[test]
    fn test_no_target_level_never_activates() {
        assert_eq!(deposit(RequestStatus::Pending, None).activates_level(None), None);
        assert_eq!(
            deposit(RequestStatus::Pending, None).activates_level(Some(1)),
            None
        );
    }

    #[test]
    fn test_target_activates_when_account_has_no_level() {
        assert_eq!(
            deposit(RequestStatus::Pending, Some(2)).activates_level(None),
            Some(2)
        );
    }

    #[test]
    fn test_target_activates_when_level_differs() {
        assert_eq!(
            deposit(RequestStatus::Pending, Some(2)).activates_level(Some(1)),
            Some(2)
        );
    }

    #[test]
    fn test_same_level_does_not_reactivate() {
        assert_eq!(
            deposit(RequestStatus::Pending, Some(2)).activates_level(Some(2)),
            None
        );
    }
}
