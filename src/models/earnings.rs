use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::platform_offset;

/// At most one of these exists per (user, day); the unique key enforces it.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct DailyEarning {
    pub id: String,
    pub user_id: String,
    pub level_id: Option<i32>,
    pub amount: Decimal,
    pub earned_on: NaiveDate,
}

/// Calendar date at the platform's fixed offset.
pub fn local_today(now: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    now.with_timezone(&platform_offset(utc_offset_hours)).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_today_matches_utc_during_the_day() {
        let now = Utc.with_ymd_and_hms(2025, 8, 5, 12, 0, 0).unwrap();
        assert_eq!(
            local_today(now, 1),
            NaiveDate::from_ymd_opt(2025, 8, 5).unwrap()
        );
    }

    #[test]
    fn test_positive_offset_rolls_into_the_next_day() {
        let now = Utc.with_ymd_and_hms(2025, 8, 5, 23, 30, 0).unwrap();
        assert_eq!(
            local_today(now, 1),
            NaiveDate::from_ymd_opt(2025, 8, 6).unwrap()
        );
    }

    #[test]
    fn test_negative_offset_rolls_into_the_previous_day() {
        let now = Utc.with_ymd_and_hms(2025, 8, 5, 0, 30, 0).unwrap();
        assert_eq!(
            local_today(now, -1),
            NaiveDate::from_ymd_opt(2025, 8, 4).unwrap()
        );
    }
}
