//! JWT token verification for both token kinds.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use miami_core::config::AuthConfig;
use miami_core::error::AppError;
use miami_entity::user::UserIdentity;

use super::claims::{Claims, TokenType};

/// Validates JWT tokens against the key of the expected kind.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Ok(Self {
            access_key: DecodingKey::from_secret(config.jwt_access_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            validation,
        })
    }

    /// Verifies `token` as a token of kind `expected`.
    ///
    /// Returns `None` for a bad signature, a malformed token, an expired
    /// token, or a token of the other kind. Callers cannot tell these apart.
    pub fn verify(&self, token: &str, expected: TokenType) -> Option<UserIdentity> {
        self.decode(token, expected).ok().map(|c| c.identity())
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(token, TokenType::Access)
    }

    /// Decodes and validates a refresh token string.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(token, TokenType::Refresh)
    }

    fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        if token.is_empty() {
            return Err(AppError::unauthorized("Missing token"));
        }

        let key = match expected {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };

        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| {
                debug!(token_type = %expected, error = %e, "Token verification failed");
                AppError::unauthorized("Invalid token")
            })?
            .claims;

        if claims.token_type != expected {
            debug!(
                token_type = %expected,
                actual = %claims.token_type,
                "Token kind mismatch"
            );
            return Err(AppError::unauthorized("Invalid token"));
        }

        Ok(claims)
    }
}
