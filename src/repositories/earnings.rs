use crate::models::earnings::DailyEarning;
use crate::models::ledger::LedgerAccount;
use crate::models::levels::Level;
use crate::models::LedgerError;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct EarningsRepository {
    conn: PgPool,
}

impl EarningsRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    /// One payout per user per calendar day while the level is active. The
    /// (user, day) unique key is the arbiter; losing the insert race maps to
    /// `AlreadyClaimed`.
    pub async fn claim(&self, user_id: &str, today: NaiveDate) -> Result<DailyEarning, LedgerError> {
        let now = Utc::now();
        let mut tx = self.conn.begin().await?;

        let account = sqlx::query_as::<_, LedgerAccount>(
            "SELECT * FROM ledger_accounts WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::NotFound("ledger account"))?;

        let (level_id, activated_at) = match (account.active_level_id, account.level_activated_at) {
            (Some(level_id), Some(activated_at)) => (level_id, activated_at),
            _ => return Err(LedgerError::NoActiveLevel),
        };

        let level = sqlx::query_as::<_, Level>("SELECT * FROM levels WHERE id = $1")
            .bind(level_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LedgerError::NotFound("level"))?;

        if level.expired_since(activated_at, now) {
            return Err(LedgerError::NoActiveLevel);
        }

        let earning_id = Uuid::new_v4().hyphenated().to_string();
        let inserted = sqlx::query(
            r#"
                INSERT INTO daily_earnings (id, user_id, level_id, amount, earned_on)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, earned_on) DO NOTHING
            "#,
        )
        .bind(&earning_id)
        .bind(user_id)
        .bind(level_id)
        .bind(level.daily_payout)
        .bind(today)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(LedgerError::AlreadyClaimed);
        }

        sqlx::query(
            r#"
                UPDATE ledger_accounts
                SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP
                WHERE user_id = $2
            "#,
        )
        .bind(level.daily_payout)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DailyEarning {
            id: earning_id,
            user_id: user_id.to_string(),
            level_id: Some(level_id),
            amount: level.daily_payout,
            earned_on: today,
        })
    }
}
