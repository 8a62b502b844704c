use crate::models::users::{generate_referral_code, TeamMember, User};
use crate::models::LedgerError;

use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    conn: PgPool,
}

impl UserRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    /// Registers a user together with its ledger account and, when the
    /// referral code resolves, the inviter edge. An unknown code is a soft
    /// failure: the user is registered with no edge.
    pub async fn insert_user(
        &self,
        phone_number: &str,
        name: Option<&str>,
        referral_code: Option<&str>,
    ) -> Result<User, LedgerError> {
        let inviter: Option<User> = match referral_code {
            Some(code) => {
                let inviter =
                    sqlx::query_as::<_, User>("SELECT * FROM users WHERE referral_code = $1")
                        .bind(code)
                        .fetch_optional(&self.conn)
                        .await?;
                if inviter.is_none() {
                    log::warn!("Unknown referral code {}, registering without inviter.", code);
                }
                inviter
            }
            None => None,
        };

        let user_id = Uuid::new_v4().hyphenated().to_string();
        let own_code = self.unused_referral_code().await?;

        let mut tx = self.conn.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
                INSERT INTO users (id, phone_number, name, referral_code, referred_by)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            "#,
        )
        .bind(&user_id)
        .bind(phone_number)
        .bind(name)
        .bind(&own_code)
        .bind(inviter.as_ref().map(|u| u.id.clone()))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO ledger_accounts (user_id) VALUES ($1)")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;

        if let Some(inviter) = &inviter {
            sqlx::query("INSERT INTO referrals (id, inviter_id, invitee_id) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4().hyphenated().to_string())
                .bind(&inviter.id)
                .bind(&user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(user)
    }

    /// Direct invitees only; subsidies are single-level, nothing walks
    /// further down the graph.
    pub async fn get_team(&self, user_id: &str) -> Result<Vec<TeamMember>, LedgerError> {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
                SELECT u.phone_number, u.name, r.created_at AS invited_at,
                       l.name AS active_level, r.subsidy_granted
                FROM referrals r
                JOIN users u ON u.id = r.invitee_id
                JOIN ledger_accounts a ON a.user_id = r.invitee_id
                LEFT JOIN levels l ON l.id = a.active_level_id
                WHERE r.inviter_id = $1
                ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(members)
    }

    async fn unused_referral_code(&self) -> Result<String, LedgerError> {
        loop {
            let code = generate_referral_code();
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE referral_code = $1)")
                    .bind(&code)
                    .fetch_one(&self.conn)
                    .await?;
            if !taken {
                return Ok(code);
            }
        }
    }
}
