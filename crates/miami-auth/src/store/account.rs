//! Account store trait and its Postgres implementation.

use async_trait::async_trait;

use miami_core::result::AppResult;
use miami_core::types::UserId;
use miami_database::repositories::UserRepository;
use miami_entity::user::{CreateUser, User};

/// Account lookups and writes needed by the auth flows.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug {
    /// Finds an account by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Finds an account by ID.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Finds the account owning an activation link.
    async fn find_by_activation_link(&self, link: &str) -> AppResult<Option<User>>;

    /// Inserts a new account. Fails with `Conflict` on a duplicate email.
    async fn insert(&self, data: CreateUser) -> AppResult<User>;

    /// Marks the account owning `link` as activated.
    async fn set_activated(&self, link: &str) -> AppResult<()>;
}

#[async_trait]
impl AccountStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        UserRepository::find_by_email(self, email).await
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        UserRepository::find_by_id(self, id).await
    }

    async fn find_by_activation_link(&self, link: &str) -> AppResult<Option<User>> {
        UserRepository::find_by_activation_link(self, link).await
    }

    async fn insert(&self, data: CreateUser) -> AppResult<User> {
        self.create(&data).await
    }

    async fn set_activated(&self, link: &str) -> AppResult<()> {
        UserRepository::set_activated(self, link).await.map(|_| ())
    }
}
