//! Token signing configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for `access_ttl_minutes` (one day).
pub const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;

/// Upper bound for `refresh_ttl_days`.
pub const MAX_REFRESH_TTL_DAYS: u64 = 365;

/// Signing secrets and lifetimes for the access and refresh token kinds.
///
/// The two kinds use independent secrets. Both must be non-empty; the
/// service refuses to start otherwise.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default)]
    pub jwt_access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    #[serde(default)]
    pub jwt_refresh_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Allowed clock skew when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl AuthConfig {
    /// Checks that both signing secrets are present.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_access_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.jwt_access_secret must be set",
            ));
        }
        if self.jwt_refresh_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.jwt_refresh_secret must be set",
            ));
        }
        if !(1..=MAX_ACCESS_TTL_MINUTES).contains(&self.access_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "auth.access_ttl_minutes must be between 1 and {MAX_ACCESS_TTL_MINUTES}"
            )));
        }
        if !(1..=MAX_REFRESH_TTL_DAYS).contains(&self.refresh_ttl_days) {
            return Err(AppError::configuration(format!(
                "auth.refresh_ttl_days must be between 1 and {MAX_REFRESH_TTL_DAYS}"
            )));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_access_secret: String::new(),
            jwt_refresh_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            leeway_seconds: default_leeway(),
        }
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_access_secret", &"<redacted>")
            .field("jwt_refresh_secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

fn default_access_ttl() -> u64 {
    30
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_leeway() -> u64 {
    5
}
