use crate::models::levels::Level;
use crate::models::LedgerError;

use sqlx::PgPool;

#[derive(Clone)]
pub struct LevelRepository {
    conn: PgPool,
}

impl LevelRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn list_active(&self) -> Result<Vec<Level>, LedgerError> {
        let levels = sqlx::query_as::<_, Level>(
            "SELECT * FROM levels WHERE is_active = TRUE ORDER BY minimum_deposit",
        )
        .fetch_all(&self.conn)
        .await?;

        Ok(levels)
    }
}
