//! `AuthUser` extractor: pulls the bearer token from the Authorization header
//! and verifies it as an access token.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use miami_core::error::AppError;
use miami_entity::user::UserIdentity;

use crate::error::ApiError;
use crate::state::AppState;

/// Verified identity of the caller, available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserIdentity);

impl AuthUser {
    /// Returns the inner identity.
    pub fn identity(&self) -> &UserIdentity {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = UserIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Verifies the bearer access token in `headers`.
pub fn verify_bearer(headers: &HeaderMap, state: &AppState) -> Result<UserIdentity, AppError> {
    let Authorization(bearer) = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

    state.session_manager.authenticate(bearer.token())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by `require_auth`.
        if let Some(identity) = parts.extensions.get::<UserIdentity>() {
            return Ok(AuthUser(identity.clone()));
        }

        Ok(AuthUser(verify_bearer(&parts.headers, state)?))
    }
}
