//! Refresh store trait and its Postgres implementation.

use async_trait::async_trait;

use miami_core::result::AppResult;
use miami_core::types::UserId;
use miami_database::repositories::RefreshTokenRepository;
use miami_entity::token::RefreshTokenRecord;

/// Holds at most one refresh token per account.
///
/// Implementations must make `upsert` atomic per user: concurrent writers
/// for the same user leave exactly one record, the last one written.
#[async_trait]
pub trait RefreshStore: Send + Sync + std::fmt::Debug {
    /// Inserts or replaces the refresh token of `user_id`.
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> AppResult<()>;

    /// Finds the record holding exactly this token.
    async fn find_by_token(&self, refresh_token: &str) -> AppResult<Option<RefreshTokenRecord>>;

    /// Deletes the record holding this token. Deleting an unknown token is
    /// not an error and yields `None`.
    async fn delete_by_token(&self, refresh_token: &str)
    -> AppResult<Option<RefreshTokenRecord>>;
}

#[async_trait]
impl RefreshStore for RefreshTokenRepository {
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> AppResult<()> {
        RefreshTokenRepository::upsert(self, user_id, refresh_token)
            .await
            .map(|_| ())
    }

    async fn find_by_token(&self, refresh_token: &str) -> AppResult<Option<RefreshTokenRecord>> {
        RefreshTokenRepository::find_by_token(self, refresh_token).await
    }

    async fn delete_by_token(
        &self,
        refresh_token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        RefreshTokenRepository::delete_by_token(self, refresh_token).await
    }
}
