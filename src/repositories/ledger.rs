use crate::models::ledger::{BankDetails, LedgerAccount};
use crate::models::LedgerError;

use sqlx::PgPool;

#[derive(Clone)]
pub struct LedgerRepository {
    conn: PgPool,
}

impl LedgerRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    /// Every user has exactly one ledger account; a miss here is a
    /// provisioning fault, not user input.
    pub async fn get_account(&self, user_id: &str) -> Result<LedgerAccount, LedgerError> {
        sqlx::query_as::<_, LedgerAccount>("SELECT * FROM ledger_accounts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.conn)
            .await?
            .ok_or(LedgerError::NotFound("ledger account"))
    }

    /// Profile writes touch the payout defaults only, never balances.
    pub async fn update_bank_details(
        &self,
        user_id: &str,
        details: &BankDetails,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            r#"
                UPDATE ledger_accounts
                SET bank_name = $1, iban = $2, updated_at = CURRENT_TIMESTAMP
                WHERE user_id = $3
            "#,
        )
        .bind(&details.bank_name)
        .bind(&details.iban)
        .bind(user_id)
        .execute(&self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound("ledger account"));
        }

        Ok(())
    }
}
