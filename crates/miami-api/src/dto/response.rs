//! Response DTOs.

use serde::{Deserialize, Serialize};

use miami_auth::session::AuthResult;
use miami_entity::user::UserIdentity;

/// Body returned by registration, login, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access token for the `Authorization: Bearer` header.
    pub access_token: String,
    /// Refresh token, also set as the refresh cookie.
    pub refresh_token: String,
    /// Identity the tokens were minted for.
    pub user: UserIdentity,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            access_token: result.tokens.access_token,
            refresh_token: result.tokens.refresh_token,
            user: result.user,
        }
    }
}

/// Body returned by logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Whether a stored refresh token was removed.
    pub removed: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
}
