//! The identity view embedded in tokens and returned to clients.

use serde::{Deserialize, Serialize};

use miami_core::types::UserId;

use super::model::User;

/// Identity claims derived from an account at mint time.
///
/// This is the only place an account is turned into claims; every flow
/// (registration, login, refresh) goes through `From<&User>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Account identifier.
    pub id: UserId,
    /// Account email.
    pub email: String,
    /// Activation flag at mint time.
    pub is_activated: bool,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_activated: user.is_activated,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_identity_from_user_omits_secrets() {
        let user = User {
            id: UserId::new(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$...".into(),
            is_activated: true,
            activation_link: "link".into(),
            created_at: Utc::now(),
        };

        let identity = UserIdentity::from(&user);
        assert_eq!(identity.id, user.id);
        assert!(identity.is_activated);

        let json = serde_json::to_value(&identity).expect("serialize");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["isActivated"], true);
        assert!(json.get("passwordHash").is_none());
    }
}
