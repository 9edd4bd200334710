//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod mail;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::mail::MailConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "MIAMI";

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration
/// (`config/default.toml` + environment overlay + `MIAMI__*` variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Token signing settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Activation mail settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `MIAMI__`
    /// (for example `MIAMI__AUTH__JWT_ACCESS_SECRET`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("MIAMI__DATABASE__URL", Some("postgres://localhost/miami")),
                ("MIAMI__AUTH__JWT_ACCESS_SECRET", Some("access-secret")),
                ("MIAMI__AUTH__JWT_REFRESH_SECRET", Some("refresh-secret")),
                ("MIAMI__SERVER__PORT", Some("5050")),
            ],
            || {
                let config = AppConfig::load("test").expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/miami");
                assert_eq!(config.server.port, 5050);
                assert_eq!(config.auth.jwt_access_secret, "access-secret");
                assert_eq!(config.auth.access_ttl_minutes, 30);
                assert_eq!(config.auth.refresh_ttl_days, 30);
                assert!(config.auth.validate().is_ok());
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars([("MIAMI__DATABASE__URL", None::<&str>)], || {
            let err = AppConfig::load("test").expect_err("database url is mandatory");
            assert!(err.is(crate::ErrorKind::Configuration));
        });
    }
}
