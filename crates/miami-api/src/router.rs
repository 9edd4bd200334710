//! Route definitions for the MiamiMusic HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use miami_core::error::AppError;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Fails with a `Configuration` error when the CORS settings are unusable.
pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(protected_routes(state.clone()))
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors)?;

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state))
}

/// Public auth endpoints
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/registration", post(handlers::auth::registration))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", get(handlers::auth::refresh))
        .route("/auth/activate/{link}", get(handlers::auth::activate))
}

/// Endpoints behind the bearer middleware
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
