use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Level {
    pub id: i32,
    pub name: String,
    pub minimum_deposit: Decimal,
    pub daily_payout: Decimal,
    pub period_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Level {
    /// Expiry is derived from the activation timestamp; it is never stored.
    pub fn expired_since(&self, activated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now >= activated_at + Duration::days(self.period_days as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bronze() -> Level {
        Level {
            id: 1,
            name: "Bronze".to_string(),
            minimum_deposit: Decimal::new(300000, 2),
            daily_payout: Decimal::new(15000, 2),
            period_days: 365,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_not_expired_inside_period() {
        let activated = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap();
        assert!(!bronze().expired_since(activated, now));
    }

    #[test]
    fn test_expired_at_boundary() {
        let activated = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let now = activated + Duration::days(365);
        assert!(bronze().expired_since(activated, now));
    }

    #[test]
    fn test_expired_after_period() {
        let activated = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(bronze().expired_since(activated, now));
    }
}
