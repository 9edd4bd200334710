//! # miami-api
//!
//! HTTP API layer for MiamiMusic built on Axum.
//!
//! Exposes the session flows under `/api/auth`, carries the refresh token in
//! an http-only cookie, verifies bearer access tokens for protected routes,
//! and maps [`miami_core::AppError`] kinds to HTTP status codes.

pub mod cookie;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
