//! User account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use miami_core::types::UserId;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique account identifier.
    pub id: UserId,
    /// Login email, unique across accounts.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the activation link has been followed.
    pub is_activated: bool,
    /// Opaque activation link token mailed at registration.
    #[serde(skip_serializing)]
    pub activation_link: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Freshly generated activation link token.
    pub activation_link: String,
}
