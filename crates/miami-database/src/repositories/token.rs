//! Refresh-token repository.

use sqlx::PgPool;
use tracing::debug;

use miami_core::error::{AppError, ErrorKind};
use miami_core::result::AppResult;
use miami_core::types::UserId;
use miami_entity::token::RefreshTokenRecord;

/// Repository for the per-user refresh-token row.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh-token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the refresh token for `user_id`.
    ///
    /// A single statement keyed on the primary key, so concurrent writers for
    /// the same user serialize on the row and the last one wins.
    pub async fn upsert(&self, user_id: UserId, refresh_token: &str) -> AppResult<RefreshTokenRecord> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "INSERT INTO refresh_tokens (user_id, refresh_token, updated_at) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id) DO UPDATE \
             SET refresh_token = EXCLUDED.refresh_token, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(user_id)
        .bind(refresh_token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert refresh token", e)
        })?;

        debug!(user_id = %user_id, "Refresh token stored");
        Ok(record)
    }

    /// Find the record holding exactly this token.
    pub async fn find_by_token(&self, refresh_token: &str) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT * FROM refresh_tokens WHERE refresh_token = $1",
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e))
    }

    /// Delete the record holding this token, returning it if one existed.
    pub async fn delete_by_token(
        &self,
        refresh_token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "DELETE FROM refresh_tokens WHERE refresh_token = $1 RETURNING *",
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete refresh token", e)
        })
    }
}
