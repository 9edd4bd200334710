//! JWT token creation with per-kind signing keys and lifetimes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use miami_core::config::AuthConfig;
use miami_core::error::AppError;
use miami_entity::user::UserIdentity;

use super::claims::{Claims, TokenType};

/// Signing material for one token kind.
#[derive(Clone)]
struct SigningContext {
    key: EncodingKey,
    ttl: Duration,
}

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    access: SigningContext,
    refresh: SigningContext,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    ///
    /// Fails with a configuration error when either signing secret is missing.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        config.validate()?;

        Ok(Self {
            access: SigningContext {
                key: EncodingKey::from_secret(config.jwt_access_secret.as_bytes()),
                ttl: Duration::minutes(config.access_ttl_minutes as i64),
            },
            refresh: SigningContext {
                key: EncodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
                ttl: Duration::days(config.refresh_ttl_days as i64),
            },
        })
    }

    /// Mints a token of the given kind for `identity`, valid from now.
    pub fn mint(&self, identity: &UserIdentity, token_type: TokenType) -> Result<String, AppError> {
        self.mint_at(identity, token_type, Utc::now())
            .map(|(token, _)| token)
    }

    /// Mints a token as if issued at `issued_at`.
    ///
    /// Returns the token and its expiration instant.
    pub fn mint_at(
        &self,
        identity: &UserIdentity,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let ctx = self.context(token_type);
        let expires_at = issued_at + ctx.ttl;
        let claims = Claims::new(identity, token_type, issued_at, expires_at);

        let token = encode(&Header::default(), &claims, &ctx.key).map_err(|e| {
            AppError::internal(format!("Failed to encode {token_type} token: {e}"))
        })?;

        Ok((token, expires_at))
    }

    /// Generates a new access + refresh token pair for `identity`.
    pub fn generate_token_pair(&self, identity: &UserIdentity) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let (access_token, access_expires_at) = self.mint_at(identity, TokenType::Access, now)?;
        let (refresh_token, refresh_expires_at) =
            self.mint_at(identity, TokenType::Refresh, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Lifetime of tokens of the given kind.
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        self.context(token_type).ttl
    }

    fn context(&self, token_type: TokenType) -> &SigningContext {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use miami_core::types::UserId;

    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_access_secret: "access-secret".into(),
            jwt_refresh_secret: "refresh-secret".into(),
            ..AuthConfig::default()
        }
    }

    fn identity() -> UserIdentity {
        UserIdentity {
            id: UserId::new(),
            email: "a@x.com".into(),
            is_activated: false,
        }
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let err = JwtEncoder::new(&AuthConfig::default()).expect_err("no secrets configured");
        assert!(err.is(miami_core::ErrorKind::Configuration));
    }

    #[test]
    fn test_out_of_range_ttl_is_configuration_error() {
        let huge = AuthConfig {
            refresh_ttl_days: u64::MAX,
            ..config()
        };
        let err = JwtEncoder::new(&huge).expect_err("ttl overflows chrono");
        assert!(err.is(miami_core::ErrorKind::Configuration));

        let zero = AuthConfig {
            access_ttl_minutes: 0,
            ..config()
        };
        assert!(JwtEncoder::new(&zero).is_err());
    }

    #[test]
    fn test_pair_expirations_follow_ttls() {
        let encoder = JwtEncoder::new(&config()).unwrap();
        let pair = encoder.generate_token_pair(&identity()).unwrap();

        assert_ne!(pair.access_token, pair.refresh_token);
        let gap = pair.refresh_expires_at - pair.access_expires_at;
        assert_eq!(gap, Duration::days(30) - Duration::minutes(30));
    }

    #[test]
    fn test_same_second_mints_differ() {
        let encoder = JwtEncoder::new(&config()).unwrap();
        let who = identity();
        let now = Utc::now();
        let (first, _) = encoder.mint_at(&who, TokenType::Refresh, now).unwrap();
        let (second, _) = encoder.mint_at(&who, TokenType::Refresh, now).unwrap();
        assert_ne!(first, second);
    }
}
