//! Refresh-token cookie helpers.
//!
//! The refresh token travels only in an http-only cookie scoped to
//! `/api/auth`, so scripts on the client never see it and it is not sent
//! with ordinary API calls.

use axum::http::HeaderValue;
use axum_extra::extract::CookieJar;

use miami_core::error::AppError;

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Path the refresh cookie is scoped to.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// Builds the `Set-Cookie` value carrying a refresh token.
pub fn refresh_cookie(
    token: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}={token}; Path={REFRESH_COOKIE_PATH}; HttpOnly; SameSite=Strict; Max-Age={}",
        max_age_seconds.max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid refresh cookie: {e}")))
}

/// Builds the `Set-Cookie` value that removes the refresh cookie.
pub fn clear_refresh_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    refresh_cookie("", 0, secure)
}

/// Reads the refresh token from the request cookies.
///
/// A missing or empty cookie yields an empty string, which the session
/// manager treats as "no token".
pub fn read_refresh_token(jar: &CookieJar) -> String {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .unwrap_or_default()
}
