//! CORS layer configuration.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;

use miami_core::config::CorsConfig;
use miami_core::error::AppError;

/// Builds a CORS tower layer from configuration.
///
/// Credentials are allowed so the browser sends the refresh cookie, and
/// browsers refuse credentialed responses for a wildcard origin, so `*` is a
/// configuration error. Every origin must be a valid header value.
pub fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer, AppError> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            if origin.trim() == "*" {
                return Err(AppError::configuration(
                    "server.cors.allowed_origins cannot contain '*' when credentials are allowed",
                ));
            }
            origin.parse::<HeaderValue>().map_err(|e| {
                AppError::configuration(format!("Invalid CORS origin '{origin}': {e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(config.max_age_seconds)))
}
