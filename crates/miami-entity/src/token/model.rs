//! Refresh-token record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use miami_core::types::UserId;

/// The single active refresh token of an account.
///
/// At most one record exists per `user_id`; issuing a new token replaces
/// the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    /// Owning account.
    pub user_id: UserId,
    /// The raw refresh JWT.
    pub refresh_token: String,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}
