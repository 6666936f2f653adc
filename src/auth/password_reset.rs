use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::session::hash_token;
use crate::error::{AppError, Result};

/// Single-use password-reset tokens. Only the SHA-256 of a token is stored.
pub struct ResetTokenStore {
    pool: SqlitePool,
}

impl ResetTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // One outstanding token per user
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(hash_token(token))
        .bind(expires_at.naive_utc())
        .bind(Utc::now().naive_utc())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deletes the token and returns its user if it was valid and unexpired.
    pub async fn consume(&self, token: &str) -> Result<Option<Uuid>> {
        let token_hash = hash_token(token);
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM password_reset_tokens WHERE token_hash = ? AND expires_at > ?"
        )
        .bind(&token_hash)
        .bind(Utc::now().naive_utc())
        .fetch_optional(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        user_id
            .map(|id| Uuid::parse_str(&id).map_err(|e| AppError::Database(e.to_string())))
            .transpose()
    }
}
