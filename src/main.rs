//! MiamiMusic auth server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use miami_api::AppState;
use miami_auth::store::{AccountStore, RefreshStore};
use miami_auth::{
    ActivationMailer, JwtDecoder, JwtEncoder, LogMailer, PasswordHasher, SessionManager,
};
use miami_core::config::AppConfig;
use miami_core::error::AppError;
use miami_database::DatabasePool;
use miami_database::repositories::token::RefreshTokenRepository;
use miami_database::repositories::user::UserRepository;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("MIAMI_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting MiamiMusic auth v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Token codec (fails fast on missing secrets) ─────
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth)?);
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth)?);

    // ── Step 2: Database connection + migrations ─────────────────
    let db_pool = DatabasePool::connect_and_migrate(&config.database).await?;

    // ── Step 3: Stores and collaborators ─────────────────────────
    let accounts: Arc<dyn AccountStore> = Arc::new(UserRepository::new(db_pool.pool().clone()));
    let refresh_store: Arc<dyn RefreshStore> =
        Arc::new(RefreshTokenRepository::new(db_pool.pool().clone()));
    let mailer: Arc<dyn ActivationMailer> = Arc::new(LogMailer::new(&config.mail));

    let session_manager = Arc::new(SessionManager::new(
        jwt_encoder,
        jwt_decoder,
        accounts,
        refresh_store,
        Arc::new(PasswordHasher::new()),
        mailer,
        config.server.api_url.clone(),
    ));

    // ── Step 4: Build and start HTTP server ─────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = miami_api::build_router(AppState::new(Arc::new(config), session_manager))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("MiamiMusic auth server listening on {}", addr);

    // ── Step 5: Graceful shutdown ───────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db_pool.close().await;
    tracing::info!("MiamiMusic auth server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
