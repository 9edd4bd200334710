//! Auth handlers: registration, activation, login, logout, refresh, me.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use miami_auth::session::AuthResult;
use miami_entity::user::UserIdentity;

use crate::cookie::{clear_refresh_cookie, read_refresh_token, refresh_cookie};
use crate::dto::request::CredentialsRequest;
use crate::dto::response::{AuthResponse, LogoutResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/registration
pub async fn registration(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let result = state
        .session_manager
        .register(&req.email, &req.password)
        .await?;
    issue(&state, result)
}

/// GET /api/auth/activate/{link}
pub async fn activate(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Redirect, ApiError> {
    state.session_manager.activate(&link).await?;
    Ok(Redirect::to(&state.config.server.client_url))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let result = state
        .session_manager
        .login(&req.email, &req.password)
        .await?;
    issue(&state, result)
}

/// POST /api/auth/logout
///
/// Always clears the cookie, even when no stored token matched.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let token = read_refresh_token(&jar);
    let removed = state.session_manager.logout(&token).await?;

    let cookie = clear_refresh_cookie(state.config.server.secure_cookies)?;
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LogoutResponse {
            removed: removed.is_some(),
        }),
    )
        .into_response())
}

/// GET /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let token = read_refresh_token(&jar);
    let result = state.session_manager.refresh(&token).await?;
    issue(&state, result)
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<UserIdentity> {
    Json(auth.0)
}

/// Sets the refresh cookie and returns the token body.
fn issue(state: &AppState, result: AuthResult) -> Result<Response, ApiError> {
    let max_age = (result.tokens.refresh_expires_at - Utc::now()).num_seconds();
    let cookie = refresh_cookie(
        &result.tokens.refresh_token,
        max_age,
        state.config.server.secure_cookies,
    )?;
    Ok(([(SET_COOKIE, cookie)], Json(AuthResponse::from(result))).into_response())
}
