//! Server and CORS configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL of this API, used to build activation links.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Front-end URL users are redirected to after activation.
    #[serde(default = "default_client_url")]
    pub client_url: String,
    /// Mark the refresh cookie `Secure`.
    #[serde(default)]
    pub secure_cookies: bool,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_url: default_api_url(),
            client_url: default_client_url(),
            secure_cookies: false,
            cors: CorsConfig::default(),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
///
/// Credentials are always allowed because the refresh token travels in a
/// cookie, so the origin list must be explicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_client_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![default_client_url()]
}

fn default_max_age() -> u64 {
    3600
}
