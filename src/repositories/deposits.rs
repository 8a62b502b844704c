use crate::models::deposits::{BankAccount, Deposit, NewDeposit};
use crate::models::ledger::LedgerAccount;
use crate::models::referrals::Referral;
use crate::models::{LedgerError, RequestStatus};

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct SubsidyGrant {
    pub inviter_id: String,
    pub invitee_id: String,
    pub amount: Decimal,
}

pub struct DepositApproval {
    pub deposit: Deposit,
    pub activated_level: Option<i32>,
    pub subsidy: Option<SubsidyGrant>,
}

#[derive(Clone)]
pub struct DepositRepository {
    conn: PgPool,
}

impl DepositRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    /// Creates the pending request; the ledger is untouched until approval.
    pub async fn submit(&self, new: &NewDeposit) -> Result<Deposit, LedgerError> {
        if new.amount <= Decimal::ZERO {
            return Err(LedgerError::BelowMinimumAmount);
        }

        let deposit_id = Uuid::new_v4().hyphenated().to_string();
        let deposit = sqlx::query_as::<_, Deposit>(
            r#"
                INSERT INTO deposits
                (id, user_id, amount, proof_reference, bank_account_id, level_id, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            "#,
        )
        .bind(&deposit_id)
        .bind(&new.user_id)
        .bind(new.amount)
        .bind(&new.proof_reference)
        .bind(&new.bank_account_id)
        .bind(new.level_id)
        .bind(RequestStatus::Pending.as_str())
        .fetch_one(&self.conn)
        .await?;

        Ok(deposit)
    }

    /// The pending -> approved transition, with every ledger effect in the
    /// same transaction: balance credit, level activation and the one-time
    /// inviter subsidy. Concurrent approvals serialize on the deposit row
    /// lock; the loser sees a decided row and gets `InvalidTransition`.
    pub async fn approve(
        &self,
        deposit_id: &str,
        subsidy_amount: Decimal,
    ) -> Result<DepositApproval, LedgerError> {
        let mut tx = self.conn.begin().await?;

        let deposit =
            sqlx::query_as::<_, Deposit>("SELECT * FROM deposits WHERE id = $1 FOR UPDATE")
                .bind(deposit_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(LedgerError::NotFound("deposit"))?;
        deposit.ensure_pending()?;

        let deposit = sqlx::query_as::<_, Deposit>(
            r#"
                UPDATE deposits
                SET status = $1, approved_at = CURRENT_TIMESTAMP
                WHERE id = $2
                RETURNING *
            "#,
        )
        .bind(RequestStatus::Approved.as_str())
        .bind(deposit_id)
        .fetch_one(&mut *tx)
        .await?;

        let account = sqlx::query_as::<_, LedgerAccount>(
            "SELECT * FROM ledger_accounts WHERE user_id = $1 FOR UPDATE",
        )
        .bind(&deposit.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::NotFound("ledger account"))?;

        let activated_level = deposit.activates_level(account.active_level_id);

        match activated_level {
            Some(level_id) => {
                sqlx::query(
                    r#"
                        UPDATE ledger_accounts
                        SET balance = balance + $1,
                            total_deposited = total_deposited + $1,
                            last_deposit_approved_at = CURRENT_TIMESTAMP,
                            active_level_id = $2,
                            level_activated_at = CURRENT_TIMESTAMP,
                            updated_at = CURRENT_TIMESTAMP
                        WHERE user_id = $3
                    "#,
                )
                .bind(deposit.amount)
                .bind(level_id)
                .bind(&deposit.user_id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                        UPDATE ledger_accounts
                        SET balance = balance + $1,
                            total_deposited = total_deposited + $1,
                            last_deposit_approved_at = CURRENT_TIMESTAMP,
                            updated_at = CURRENT_TIMESTAMP
                        WHERE user_id = $2
                    "#,
                )
                .bind(deposit.amount)
                .bind(&deposit.user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let mut subsidy = None;
        let edge =
            sqlx::query_as::<_, Referral>("SELECT * FROM referrals WHERE invitee_id = $1 FOR UPDATE")
                .bind(&deposit.user_id)
                .fetch_optional(&mut *tx)
                .await?;

        if let Some(edge) = edge {
            if edge.subsidy_due(activated_level.is_some()) {
                let credited = sqlx::query(
                    r#"
                        UPDATE ledger_accounts
                        SET balance = balance + $1,
                            subsidy_balance = subsidy_balance + $1,
                            updated_at = CURRENT_TIMESTAMP
                        WHERE user_id = $2
                    "#,
                )
                .bind(subsidy_amount)
                .bind(&edge.inviter_id)
                .execute(&mut *tx)
                .await?;
                if credited.rows_affected() == 0 {
                    return Err(LedgerError::NotFound("ledger account"));
                }

                sqlx::query("UPDATE referrals SET subsidy_granted = TRUE WHERE id = $1")
                    .bind(&edge.id)
                    .execute(&mut *tx)
                    .await?;

                subsidy = Some(SubsidyGrant {
                    inviter_id: edge.inviter_id,
                    invitee_id: edge.invitee_id,
                    amount: subsidy_amount,
                });
            }
        }

        tx.commit().await?;

        Ok(DepositApproval {
            deposit,
            activated_level,
            subsidy,
        })
    }

    pub async fn reject(&self, deposit_id: &str) -> Result<Deposit, LedgerError> {
        let mut tx = self.conn.begin().await?;

        let deposit =
            sqlx::query_as::<_, Deposit>("SELECT * FROM deposits WHERE id = $1 FOR UPDATE")
                .bind(deposit_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(LedgerError::NotFound("deposit"))?;
        deposit.ensure_pending()?;

        let deposit = sqlx::query_as::<_, Deposit>(
            "UPDATE deposits SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(RequestStatus::Rejected.as_str())
        .bind(deposit_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(deposit)
    }

    pub async fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, LedgerError> {
        let accounts = sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE is_active = TRUE ORDER BY created_at",
        )
        .fetch_all(&self.conn)
        .await?;

        Ok(accounts)
    }
}
