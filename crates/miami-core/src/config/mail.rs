//! Activation mail configuration.

use serde::{Deserialize, Serialize};

/// Settings for the activation mail sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address placed in the `From` header.
    #[serde(default = "default_from")]
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: default_from(),
        }
    }
}

fn default_from() -> String {
    "no-reply@miamimusic.local".to_string()
}
