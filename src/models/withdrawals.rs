use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{platform_offset, LedgerError, RequestStatus};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Withdrawal {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub bank_name: Option<String>,
    pub iban: Option<String>,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewWithdrawal {
    pub user_id: String,
    pub amount: Decimal,
}

impl Withdrawal {
    pub fn ensure_pending(&self) -> Result<(), LedgerError> {
        if self.status == RequestStatus::Pending.as_str() {
            Ok(())
        } else {
            Err(LedgerError::InvalidTransition)
        }
    }
}

/// Request-time validation rules. Amounts and window hours come from
/// configuration; the window is Monday through Saturday, inclusive at both
/// ends, in the platform's fixed local offset.
#[derive(Clone, Debug)]
pub struct WithdrawalPolicy {
    pub minimum_amount: Decimal,
    pub utc_offset_hours: i32,
    pub opens_at_hour: u32,
    pub closes_at_hour: u32,
}

impl WithdrawalPolicy {
    pub fn check_amount(&self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO || amount < self.minimum_amount {
            return Err(LedgerError::BelowMinimumAmount);
        }
        Ok(())
    }

    pub fn check_window(&self, now: DateTime<Utc>) -> Result<(), LedgerError> {
        let local = now.with_timezone(&platform_offset(self.utc_offset_hours));
        if local.weekday() == Weekday::Sun {
            return Err(LedgerError::OutsideAllowedWindow);
        }
        let opens = NaiveTime::from_hms_opt(self.opens_at_hour, 0, 0).expect("hour in range");
        let closes = NaiveTime::from_hms_opt(self.closes_at_hour, 0, 0).expect("hour in range");
        let time = local.time();
        if time < opens || time > closes {
            return Err(LedgerError::OutsideAllowedWindow);
        }
        Ok(())
    }

    /// Start of the current local day, in UTC. The boundary for the
    /// one-pending-request-per-day rule.
    pub fn start_of_local_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let offset = platform_offset(self.utc_offset_hours);
        let local_midnight = now.with_timezone(&offset).date_naive().and_time(NaiveTime::MIN);
        DateTime::from_naive_utc_and_offset(
            local_midnight - Duration::seconds(offset.local_minus_utc() as i64),
            Utc,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn policy() -> WithdrawalPolicy {
        WithdrawalPolicy {
            minimum_amount: Decimal::new(150000, 2),
            utc_offset_hours: 1,
            opens_at_hour: 9,
            closes_at_hour: 18,
        }
    }

    fn withdrawal(status: RequestStatus) -> Withdrawal {
        Withdrawal {
            id: "w-1".to_string(),
            user_id: "u-1".to_string(),
            amount: Decimal::new(150000, 2),
            bank_name: None,
            iban: None,
            status: status.as_str().to_string(),
            requested_at: Utc.with_ymd_and_hms(2025, 8, 5, 10, 0, 0).unwrap(),
            decided_at: None,
        }
    }

    #[test]
    fn test_pending_withdrawal_passes_guard() {
        assert!(withdrawal(RequestStatus::Pending).ensure_pending().is_ok());
    }

    #[test]
    fn test_decided_withdrawal_fails_guard() {
        assert!(matches!(
            withdrawal(RequestStatus::Approved).ensure_pending(),
            Err(LedgerError::InvalidTransition)
        ));
    }

    #[test]
    fn test_amount_at_minimum_is_accepted() {
        assert!(policy().check_amount(Decimal::new(150000, 2)).is_ok());
        assert!(policy().check_amount(Decimal::new(200000, 2)).is_ok());
    }

    #[test]
    fn test_amount_below_minimum_is_rejected() {
        assert!(matches!(
            policy().check_amount(Decimal::new(149999, 2)),
            Err(LedgerError::BelowMinimumAmount)
        ));
        assert!(matches!(
            policy().check_amount(Decimal::ZERO),
            Err(LedgerError::BelowMinimumAmount)
        ));
        assert!(matches!(
            policy().check_amount(Decimal::new(-100, 2)),
            Err(LedgerError::BelowMinimumAmount)
        ));
    }

    #[test]
    fn test_window_open_tuesday_morning() {
        // 2025-08-05 is a Tuesday; 09:00 UTC is 10:00 local at +1.
        let now = Utc.with_ymd_and_hms(2025, 8, 5, 9, 0, 0).unwrap();
        assert!(policy().check_window(now).is_ok());
    }

    #[test]
    fn test_window_closed_on_sunday() {
        let now = Utc.with_ymd_and_hms(2025, 8, 3, 11, 0, 0).unwrap();
        assert!(matches!(
            policy().check_window(now),
            Err(LedgerError::OutsideAllowedWindow)
        ));
    }

    #[test]
    fn test_window_open_on_saturday() {
        let now = Utc.with_ymd_and_hms(2025, 8, 2, 11, 0, 0).unwrap();
        assert!(policy().check_window(now).is_ok());
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        // Local 09:00:00 and 18:00:00 exactly.
        let opens = Utc.with_ymd_and_hms(2025, 8, 5, 8, 0, 0).unwrap();
        let closes = Utc.with_ymd_and_hms(2025, 8, 5, 17, 0, 0).unwrap();
        assert!(policy().check_window(opens).is_ok());
        assert!(policy().check_window(closes).is_ok());
    }

    #[test]
    fn test_window_closed_outside_hours() {
        // Local 08:59:59 and 18:00:01.
        let early = Utc.with_ymd_and_hms(2025, 8, 5, 7, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 8, 5, 17, 0, 1).unwrap();
        assert!(matches!(
            policy().check_window(early),
            Err(LedgerError::OutsideAllowedWindow)
        ));
        assert!(matches!(
            policy().check_window(late),
            Err(LedgerError::OutsideAllowedWindow)
        ));
    }

    #[test]
    fn test_offset_can_move_the_day() {
        // 23:30 UTC on Saturday is already Sunday local at +1.
        let now = Utc.with_ymd_and_hms(2025, 8, 2, 23, 30, 0).unwrap();
        assert!(matches!(
            policy().check_window(now),
            Err(LedgerError::OutsideAllowedWindow)
        ));
    }

    #[test]
    fn test_start_of_local_day_in_utc() {
        let now = Utc.with_ymd_and_hms(2025, 8, 5, 10, 0, 0).unwrap();
        let start = policy().start_of_local_day(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 8, 4, 23, 0, 0).unwrap());
    }
}
