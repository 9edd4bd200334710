//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration and login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Account email.
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    /// Plain-text password.
    #[validate(length(min = 3, max = 32, message = "Password must be 3 to 32 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_validation_bounds() {
        assert!(request("a@x.com", "pwd").validate().is_ok());
        assert!(request("a@x.com", &"p".repeat(32)).validate().is_ok());
        assert!(request("a@x.com", "pw").validate().is_err());
        assert!(request("a@x.com", &"p".repeat(33)).validate().is_err());
        assert!(request("not-an-email", "secret").validate().is_err());
    }
}
