//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use miami_auth::session::manager::SessionManager;
use miami_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,
}

impl AppState {
    /// Creates the state from its parts.
    pub fn new(config: Arc<AppConfig>, session_manager: Arc<SessionManager>) -> Self {
        Self {
            config,
            session_manager,
        }
    }
}
