//! Activation mail sender abstraction.

use async_trait::async_trait;
use tracing::info;

use miami_core::config::MailConfig;
use miami_core::result::AppResult;

/// Delivers the account-activation link to a newly registered address.
#[async_trait]
pub trait ActivationMailer: Send + Sync + std::fmt::Debug {
    /// Sends the activation URL to `email`.
    async fn send_activation(&self, email: &str, activation_url: &str) -> AppResult<()>;
}

/// Local sender that logs the activation link instead of mailing it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    /// Creates a log mailer from mail configuration.
    pub fn new(config: &MailConfig) -> Self {
        Self {
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl ActivationMailer for LogMailer {
    async fn send_activation(&self, email: &str, activation_url: &str) -> AppResult<()> {
        info!(
            from = %self.from,
            to = %email,
            activation_url = %activation_url,
            "Activation mail (log sender)"
        );
        Ok(())
    }
}
