//! In-memory stores using a Tokio mutex, for tests and single-node runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use miami_core::error::AppError;
use miami_core::result::AppResult;
use miami_core::types::UserId;
use miami_entity::token::RefreshTokenRecord;
use miami_entity::user::{CreateUser, User};

use super::account::AccountStore;
use super::refresh::RefreshStore;

/// In-memory account store keyed by account ID.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn find_by_activation_link(&self, link: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.activation_link == link).cloned())
    }

    async fn insert(&self, data: CreateUser) -> AppResult<User> {
        let mut users = self.users.lock().await;

        if users.values().any(|u| u.email == data.email) {
            return Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let user = User {
            id: UserId::new(),
            email: data.email,
            password_hash: data.password_hash,
            is_activated: false,
            activation_link: data.activation_link,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_activated(&self, link: &str) -> AppResult<()> {
        let mut users = self.users.lock().await;
        if let Some(user) = users.values_mut().find(|u| u.activation_link == link) {
            user.is_activated = true;
        }
        Ok(())
    }
}

/// Both indices live behind one lock so an upsert never leaves them
/// disagreeing.
#[derive(Debug, Default)]
struct RefreshIndex {
    by_user: HashMap<UserId, RefreshTokenRecord>,
    by_token: HashMap<String, UserId>,
}

/// In-memory refresh store holding one record per account.
#[derive(Debug, Clone, Default)]
pub struct MemoryRefreshStore {
    state: Arc<Mutex<RefreshIndex>>,
}

impl MemoryRefreshStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.lock().await.by_user.len()
    }

    /// Returns `true` when no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RefreshStore for MemoryRefreshStore {
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;

        let record = RefreshTokenRecord {
            user_id,
            refresh_token: refresh_token.to_string(),
            updated_at: Utc::now(),
        };

        if let Some(previous) = state.by_user.insert(user_id, record) {
            state.by_token.remove(&previous.refresh_token);
            debug!(user_id = %user_id, "Replaced previous refresh token");
        }
        state.by_token.insert(refresh_token.to_string(), user_id);

        Ok(())
    }

    async fn find_by_token(&self, refresh_token: &str) -> AppResult<Option<RefreshTokenRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .by_token
            .get(refresh_token)
            .and_then(|user_id| state.by_user.get(user_id))
            .cloned())
    }

    async fn delete_by_token(
        &self,
        refresh_token: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let mut state = self.state.lock().await;
        let Some(user_id) = state.by_token.remove(refresh_token) else {
            return Ok(None);
        };
        Ok(state.by_user.remove(&user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, link: &str) -> CreateUser {
        CreateUser {
            email: email.into(),
            password_hash: "hash".into(),
            activation_link: link.into(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_token() {
        let store = MemoryRefreshStore::new();
        let user = UserId::new();

        store.upsert(user, "t1").await.unwrap();
        store.upsert(user, "t2").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(store.find_by_token("t1").await.unwrap().is_none());
        let record = store.find_by_token("t2").await.unwrap().unwrap();
        assert_eq!(record.user_id, user);
        assert_eq!(record.refresh_token, "t2");
    }

    #[tokio::test]
    async fn test_records_are_per_user() {
        let store = MemoryRefreshStore::new();
        let (alice, bob) = (UserId::new(), UserId::new());

        store.upsert(alice, "a1").await.unwrap();
        store.upsert(bob, "b1").await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(
            store.find_by_token("b1").await.unwrap().unwrap().user_id,
            bob
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryRefreshStore::new();
        let user = UserId::new();
        store.upsert(user, "t1").await.unwrap();

        let removed = store.delete_by_token("t1").await.unwrap();
        assert_eq!(removed.map(|r| r.user_id), Some(user));
        assert!(store.delete_by_token("t1").await.unwrap().is_none());
        assert!(store.delete_by_token("never-issued").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_record() {
        let store = MemoryRefreshStore::new();
        let user = UserId::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.upsert(user, &format!("t{i}")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 1);
        let mut live = 0;
        for i in 0..16 {
            if store.find_by_token(&format!("t{i}")).await.unwrap().is_some() {
                live += 1;
            }
        }
        assert_eq!(live, 1);
    }

    #[tokio::test]
    async fn test_account_email_conflict() {
        let store = MemoryAccountStore::new();
        store.insert(new_user("a@x.com", "l1")).await.unwrap();

        let err = store.insert(new_user("a@x.com", "l2")).await.unwrap_err();
        assert!(err.is(miami_core::ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_account_activation() {
        let store = MemoryAccountStore::new();
        let user = store.insert(new_user("a@x.com", "link-1")).await.unwrap();
        assert!(!user.is_activated);

        store.set_activated("link-1").await.unwrap();

        let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(reloaded.is_activated);
        assert!(
            store
                .find_by_activation_link("link-1")
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.find_by_activation_link("nope").await.unwrap().is_none());
    }
}
