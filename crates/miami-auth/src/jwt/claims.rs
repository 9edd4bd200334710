//! JWT claims structure shared by access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use miami_core::types::UserId;
use miami_entity::user::UserIdentity;

/// JWT claims payload embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account ID.
    pub sub: UserId,
    /// Account email at issuance.
    pub email: String,
    /// Activation flag at issuance.
    pub is_activated: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID; keeps tokens minted within the same second distinct.
    pub jti: Uuid,
    /// Token kind.
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token authorizing individual requests.
    Access,
    /// Long-lived token used only to obtain a new pair.
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

impl Claims {
    /// Builds claims for `identity` issued at `issued_at` and valid until `expires_at`.
    pub fn new(
        identity: &UserIdentity,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: identity.id,
            email: identity.email.clone(),
            is_activated: identity.is_activated,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    /// Returns the identity carried by these claims.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.sub,
            email: self.email.clone(),
            is_activated: self.is_activated,
        }
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
