//! Session lifecycle manager covering registration, activation, login, refresh, and logout.

use std::sync::Arc;

use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use miami_core::error::AppError;
use miami_entity::token::RefreshTokenRecord;
use miami_entity::user::{CreateUser, User, UserIdentity};

use crate::jwt::{JwtDecoder, JwtEncoder, TokenPair, TokenType};
use crate::mail::ActivationMailer;
use crate::password::PasswordHasher;
use crate::store::{AccountStore, RefreshStore};

/// Result of every flow that authenticates a client.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthResult {
    /// Freshly minted token pair.
    pub tokens: TokenPair,
    /// Identity the tokens were minted for.
    pub user: UserIdentity,
}

/// Manages the complete session lifecycle.
///
/// Holds no mutable state of its own; all durable state lives in the
/// account store and the refresh store.
#[derive(Clone)]
pub struct SessionManager {
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for token validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Account persistence.
    accounts: Arc<dyn AccountStore>,
    /// Refresh-token persistence.
    refresh_store: Arc<dyn RefreshStore>,
    /// Password hasher.
    password_hasher: Arc<PasswordHasher>,
    /// Activation mail sender.
    mailer: Arc<dyn ActivationMailer>,
    /// Public API base URL for activation links.
    api_url: String,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("accounts", &self.accounts)
            .field("refresh_store", &self.refresh_store)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        accounts: Arc<dyn AccountStore>,
        refresh_store: Arc<dyn RefreshStore>,
        password_hasher: Arc<PasswordHasher>,
        mailer: Arc<dyn ActivationMailer>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            accounts,
            refresh_store,
            password_hasher,
            mailer,
            api_url: api_url.into(),
        }
    }

    /// Registers a new account and signs it in.
    ///
    /// 1. Reject a duplicate email
    /// 2. Hash the password and create the unactivated account
    /// 3. Mail the activation link (best-effort)
    /// 4. Mint a token pair and store the refresh half
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResult, AppError> {
        if self.accounts.find_by_email(email).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Email '{email}' is already registered"
            )));
        }

        let password_hash = self.hash_password(password).await?;
        let activation_link = Uuid::new_v4().to_string();

        let user = self
            .accounts
            .insert(CreateUser {
                email: email.to_string(),
                password_hash,
                activation_link: activation_link.clone(),
            })
            .await?;

        info!(user_id = %user.id, "Account registered");

        let url = self.activation_url(&activation_link);
        if let Err(e) = self.mailer.send_activation(&user.email, &url).await {
            warn!(
                user_id = %user.id,
                error = %e,
                "Activation mail failed; registration continues"
            );
        }

        self.issue_tokens(&user).await
    }

    /// Marks the account owning `activation_link` as activated.
    pub async fn activate(&self, activation_link: &str) -> Result<(), AppError> {
        let user = self
            .accounts
            .find_by_activation_link(activation_link)
            .await?
            .ok_or_else(|| AppError::invalid_link("No account matches the activation link"))?;

        self.accounts.set_activated(activation_link).await?;

        info!(user_id = %user.id, "Account activated");
        Ok(())
    }

    /// Signs in with email and password.
    ///
    /// Replaces any refresh token previously issued to the account.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AppError> {
        let user = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No account for '{email}'")))?;

        if !self
            .verify_password(password, &user.password_hash)
            .await?
        {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::invalid_credentials("Password does not match"));
        }

        let result = self.issue_tokens(&user).await?;
        info!(user_id = %user.id, "Login successful");
        Ok(result)
    }

    /// Rotates a refresh token into a new pair.
    ///
    /// The token must both verify against the refresh key and still be the
    /// stored token for its account; a logged-out or superseded token fails
    /// even though its signature is valid. The identity is re-read from the
    /// account so activation changes show up in the new tokens.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResult, AppError> {
        if refresh_token.is_empty() {
            return Err(AppError::unauthorized("Missing refresh token"));
        }

        let claims = self.jwt_decoder.verify(refresh_token, TokenType::Refresh);
        let stored = self.refresh_store.find_by_token(refresh_token).await?;

        let identity = match (claims, stored) {
            (Some(identity), Some(record)) if record.user_id == identity.id => identity,
            _ => return Err(AppError::unauthorized("Refresh token is not valid")),
        };

        let user = self
            .accounts
            .find_by_id(identity.id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

        let result = self.issue_tokens(&user).await?;
        info!(user_id = %user.id, "Token refreshed");
        Ok(result)
    }

    /// Revokes a refresh token.
    ///
    /// Returns the removed record, or `None` when the token was unknown.
    pub async fn logout(&self, refresh_token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        if refresh_token.is_empty() {
            return Ok(None);
        }

        let removed = self.refresh_store.delete_by_token(refresh_token).await?;
        if let Some(record) = &removed {
            info!(user_id = %record.user_id, "Logout completed");
        }
        Ok(removed)
    }

    /// Verifies a bearer access token for a protected request.
    pub fn authenticate(&self, access_token: &str) -> Result<UserIdentity, AppError> {
        self.jwt_decoder
            .verify(access_token, TokenType::Access)
            .ok_or_else(|| AppError::unauthorized("Access token is not valid"))
    }

    /// Builds the public activation URL for a link token.
    pub fn activation_url(&self, activation_link: &str) -> String {
        format!(
            "{}/api/auth/activate/{}",
            self.api_url.trim_end_matches('/'),
            activation_link
        )
    }

    /// Argon2 runs on the blocking pool, never on a runtime worker.
    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let hasher = Arc::clone(&self.password_hasher);
        let password = password.to_string();
        task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let hasher = Arc::clone(&self.password_hasher);
        let (password, hash) = (password.to_string(), hash.to_string());
        task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }

    /// Mints a pair for `user` and stores its refresh half.
    async fn issue_tokens(&self, user: &User) -> Result<AuthResult, AppError> {
        let identity = UserIdentity::from(user);
        let tokens = self.jwt_encoder.generate_token_pair(&identity)?;

        self.refresh_store
            .upsert(user.id, &tokens.refresh_token)
            .await?;

        Ok(AuthResult {
            tokens,
            user: identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use tokio::sync::Mutex;

    use miami_core::ErrorKind;
    use miami_core::config::AuthConfig;
    use miami_core::result::AppResult;

    use super::*;
    use crate::store::{MemoryAccountStore, MemoryRefreshStore};

    /// Captures activation mails instead of sending them.
    #[derive(Debug, Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ActivationMailer for RecordingMailer {
        async fn send_activation(&self, email: &str, activation_url: &str) -> AppResult<()> {
            self.sent
                .lock()
                .await
                .push((email.to_string(), activation_url.to_string()));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingMailer;

    #[async_trait]
    impl ActivationMailer for FailingMailer {
        async fn send_activation(&self, _email: &str, _activation_url: &str) -> AppResult<()> {
            Err(AppError::external_service("SMTP relay unreachable"))
        }
    }

    struct Harness {
        manager: SessionManager,
        encoder: Arc<JwtEncoder>,
        accounts: Arc<MemoryAccountStore>,
        refresh_store: Arc<MemoryRefreshStore>,
        mailer: Arc<RecordingMailer>,
    }

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_access_secret: "access-secret".into(),
            jwt_refresh_secret: "refresh-secret".into(),
            ..AuthConfig::default()
        }
    }

    fn harness() -> Harness {
        let config = auth_config();
        let encoder = Arc::new(JwtEncoder::new(&config).unwrap());
        let decoder = Arc::new(JwtDecoder::new(&config).unwrap());
        let accounts = Arc::new(MemoryAccountStore::new());
        let refresh_store = Arc::new(MemoryRefreshStore::new());
        let mailer = Arc::new(RecordingMailer::default());

        let manager = SessionManager::new(
            Arc::clone(&encoder),
            decoder,
            Arc::clone(&accounts) as Arc<dyn AccountStore>,
            Arc::clone(&refresh_store) as Arc<dyn RefreshStore>,
            Arc::new(PasswordHasher::new()),
            Arc::clone(&mailer) as Arc<dyn ActivationMailer>,
            "http://api.test/",
        );

        Harness {
            manager,
            encoder,
            accounts,
            refresh_store,
            mailer,
        }
    }

    #[tokio::test]
    async fn test_register_issues_tokens_and_mails_link() {
        let h = harness();
        let result = h.manager.register("a@x.com", "pw").await.unwrap();

        assert_eq!(result.user.email, "a@x.com");
        assert!(!result.user.is_activated);
        assert_eq!(
            h.manager.authenticate(&result.tokens.access_token).unwrap(),
            result.user
        );

        let record = h
            .refresh_store
            .find_by_token(&result.tokens.refresh_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.user_id, result.user.id);

        let sent = h.mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "a@x.com");
        assert!(sent[0].1.starts_with("http://api.test/api/auth/activate/"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let h = harness();
        h.manager.register("a@x.com", "pw").await.unwrap();

        let err = h.manager.register("a@x.com", "other").await.unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_register_survives_mail_failure() {
        let config = auth_config();
        let refresh_store = Arc::new(MemoryRefreshStore::new());
        let manager = SessionManager::new(
            Arc::new(JwtEncoder::new(&config).unwrap()),
            Arc::new(JwtDecoder::new(&config).unwrap()),
            Arc::new(MemoryAccountStore::new()),
            Arc::clone(&refresh_store) as Arc<dyn RefreshStore>,
            Arc::new(PasswordHasher::new()),
            Arc::new(FailingMailer),
            "http://api.test",
        );

        let result = manager.register("a@x.com", "pw").await.unwrap();
        assert!(
            refresh_store
                .find_by_token(&result.tokens.refresh_token)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_activate_flow() {
        let h = harness();
        let registered = h.manager.register("a@x.com", "pw").await.unwrap();

        let url = h.mailer.sent.lock().await[0].1.clone();
        let link = url.rsplit('/').next().unwrap().to_string();

        h.manager.activate(&link).await.unwrap();
        // Re-activating a still-matching link succeeds silently.
        h.manager.activate(&link).await.unwrap();

        let user = h
            .accounts
            .find_by_id(registered.user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_activated);

        let err = h.manager.activate("bogus-link").await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidLink));
    }

    #[tokio::test]
    async fn test_login_errors() {
        let h = harness();
        h.manager.register("a@x.com", "pw").await.unwrap();

        let err = h.manager.login("a@x.com", "wrong").await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidCredentials));

        let err = h.manager.login("nobody@x.com", "pw").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_password_work_leaves_runtime_responsive() {
        let h = harness();
        h.manager.register("a@x.com", "pw").await.unwrap();

        // The ticker shares the only runtime thread with the logins.
        let ticks = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    ticks.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let logins: Vec<_> = (0..4)
            .map(|_| {
                let manager = h.manager.clone();
                tokio::spawn(async move { manager.login("a@x.com", "pw").await })
            })
            .collect();
        for login in logins {
            login.await.unwrap().unwrap();
        }
        ticker.abort();

        assert!(ticks.load(std::sync::atomic::Ordering::SeqCst) > 0);
        assert_eq!(h.refresh_store.len().await, 1);
    }

    #[tokio::test]
    async fn test_login_replaces_previous_refresh_token() {
        let h = harness();
        let registered = h.manager.register("a@x.com", "pw").await.unwrap();
        let logged_in = h.manager.login("a@x.com", "pw").await.unwrap();

        assert_eq!(h.refresh_store.len().await, 1);
        let err = h
            .manager
            .refresh(&registered.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
        assert!(
            h.manager
                .refresh(&logged_in.tokens.refresh_token)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let h = harness();
        let first = h.manager.register("a@x.com", "pw").await.unwrap();

        let second = h
            .manager
            .refresh(&first.tokens.refresh_token)
            .await
            .unwrap();

        assert_eq!(second.user.id, first.user.id);
        assert_ne!(second.tokens.access_token, first.tokens.access_token);
        assert_ne!(second.tokens.refresh_token, first.tokens.refresh_token);

        let err = h
            .manager
            .refresh(&first.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[tokio::test]
    async fn test_refresh_reflects_activation() {
        let h = harness();
        let first = h.manager.register("a@x.com", "pw").await.unwrap();
        assert!(!first.user.is_activated);

        let url = h.mailer.sent.lock().await[0].1.clone();
        let link = url.rsplit('/').next().unwrap().to_string();
        h.manager.activate(&link).await.unwrap();

        let second = h
            .manager
            .refresh(&first.tokens.refresh_token)
            .await
            .unwrap();
        assert!(second.user.is_activated);
    }

    #[tokio::test]
    async fn test_refresh_rejects_missing_and_unstored_tokens() {
        let h = harness();
        let registered = h.manager.register("a@x.com", "pw").await.unwrap();

        let err = h.manager.refresh("").await.unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));

        // Correctly signed but never stored.
        let forged = h
            .encoder
            .mint(&registered.user, TokenType::Refresh)
            .unwrap();
        let err = h.manager.refresh(&forged).await.unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));

        // Access token presented as a refresh token.
        let err = h
            .manager
            .refresh(&registered.tokens.access_token)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[tokio::test]
    async fn test_refresh_rejects_expired_stored_token() {
        let h = harness();
        let registered = h.manager.register("a@x.com", "pw").await.unwrap();

        let (expired, _) = h
            .encoder
            .mint_at(
                &registered.user,
                TokenType::Refresh,
                Utc::now() - Duration::days(31),
            )
            .unwrap();
        h.refresh_store
            .upsert(registered.user.id, &expired)
            .await
            .unwrap();

        let err = h.manager.refresh(&expired).await.unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[tokio::test]
    async fn test_logout_then_refresh_is_unauthorized() {
        let h = harness();
        h.manager.register("a@x.com", "pw").await.unwrap();
        let session = h.manager.login("a@x.com", "pw").await.unwrap();

        let removed = h
            .manager
            .logout(&session.tokens.refresh_token)
            .await
            .unwrap();
        assert_eq!(removed.map(|r| r.user_id), Some(session.user.id));

        let err = h
            .manager
            .refresh(&session.tokens.refresh_token)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[tokio::test]
    async fn test_logout_unknown_token_succeeds() {
        let h = harness();
        assert!(h.manager.logout("unknown").await.unwrap().is_none());
        assert!(h.manager.logout("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_refresh_token() {
        let h = harness();
        let registered = h.manager.register("a@x.com", "pw").await.unwrap();

        let err = h
            .manager
            .authenticate(&registered.tokens.refresh_token)
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }
}
