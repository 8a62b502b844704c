use crate::models::ledger::LedgerAccount;
use crate::models::withdrawals::{NewWithdrawal, Withdrawal, WithdrawalPolicy};
use crate::models::{LedgerError, RequestStatus};

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct WithdrawalRepository {
    conn: PgPool,
}

impl WithdrawalRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    /// Pessimistic debit: the balance leaves the account when the request is
    /// created, so a pending request can never overcommit it. The balance
    /// check and the debit share one transaction under the account row lock.
    pub async fn request(
        &self,
        new: &NewWithdrawal,
        policy: &WithdrawalPolicy,
    ) -> Result<Withdrawal, LedgerError> {
        let now = Utc::now();
        policy.check_window(now)?;

        let mut tx = self.conn.begin().await?;

        let account = sqlx::query_as::<_, LedgerAccount>(
            "SELECT * FROM ledger_accounts WHERE user_id = $1 FOR UPDATE",
        )
        .bind(&new.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::NotFound("ledger account"))?;

        let pending_today: bool = sqlx::query_scalar(
            r#"
                SELECT EXISTS(
                    SELECT 1 FROM withdrawals
                    WHERE user_id = $1 AND status = $2 AND requested_at >= $3
                )
            "#,
        )
        .bind(&new.user_id)
        .bind(RequestStatus::Pending.as_str())
        .bind(policy.start_of_local_day(now))
        .fetch_one(&mut *tx)
        .await?;
        if pending_today {
            return Err(LedgerError::DuplicatePendingRequest);
        }

        if account.balance < new.amount {
            return Err(LedgerError::InsufficientBalance);
        }
        policy.check_amount(new.amount)?;

        let withdrawal_id = Uuid::new_v4().hyphenated().to_string();
        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
                INSERT INTO withdrawals (id, user_id, amount, bank_name, iban, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            "#,
        )
        .bind(&withdrawal_id)
        .bind(&new.user_id)
        .bind(new.amount)
        .bind(&account.bank_name)
        .bind(&account.iban)
        .bind(RequestStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
                UPDATE ledger_accounts
                SET balance = balance - $1,
                    total_withdrawn = total_withdrawn + $1,
                    last_withdrawal_requested_at = CURRENT_TIMESTAMP,
                    updated_at = CURRENT_TIMESTAMP
                WHERE user_id = $2
            "#,
        )
        .bind(new.amount)
        .bind(&new.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(withdrawal)
    }

    /// The debit already happened at request time; approval only records
    /// the decision.
    pub async fn approve(&self, withdrawal_id: &str) -> Result<Withdrawal, LedgerError> {
        let mut tx = self.conn.begin().await?;

        let withdrawal =
            sqlx::query_as::<_, Withdrawal>("SELECT * FROM withdrawals WHERE id = $1 FOR UPDATE")
                .bind(withdrawal_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(LedgerError::NotFound("withdrawal"))?;
        withdrawal.ensure_pending()?;

        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
                UPDATE withdrawals
                SET status = $1, decided_at = CURRENT_TIMESTAMP
                WHERE id = $2
                RETURNING *
            "#,
        )
        .bind(RequestStatus::Approved.as_str())
        .bind(withdrawal_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(withdrawal)
    }

    /// Rejection restores the debited amount in the same transaction.
    pub async fn reject(&self, withdrawal_id: &str) -> Result<Withdrawal, LedgerError> {
        let mut tx = self.conn.begin().await?;

        let withdrawal =
            sqlx::query_as::<_, Withdrawal>("SELECT * FROM withdrawals WHERE id = $1 FOR UPDATE")
                .bind(withdrawal_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(LedgerError::NotFound("withdrawal"))?;
        withdrawal.ensure_pending()?;

        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
                UPDATE withdrawals
                SET status = $1, decided_at = CURRENT_TIMESTAMP
                WHERE id = $2
                RETURNING *
            "#,
        )
        .bind(RequestStatus::Rejected.as_str())
        .bind(withdrawal_id)
        .fetch_one(&mut *tx)
        .await?;

        let refunded = sqlx::query(
            r#"
                UPDATE ledger_accounts
                SET balance = balance + $1,
                    total_withdrawn = total_withdrawn - $1,
                    updated_at = CURRENT_TIMESTAMP
                WHERE user_id = $2
            "#,
        )
        .bind(withdrawal.amount)
        .bind(&withdrawal.user_id)
        .execute(&mut *tx)
        .await?;
        if refunded.rows_affected() == 0 {
            return Err(LedgerError::NotFound("ledger account"));
        }

        tx.commit().await?;

        Ok(withdrawal)
    }
}
