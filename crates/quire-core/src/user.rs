//! User accounts
//!
//! Authentication flows (registration, email verification, password
//! handling) live outside the core; this is the minimal record the
//! transition authority and bearer-token resolution need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Notification address
    pub email: String,
    /// Role string (author, editor, reviewer, admin)
    pub role: String,
    /// Opaque bearer token for API access
    pub auth_token: Option<String>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given role
    pub fn new(name: String, email: String, role: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            role,
            auth_token: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a bearer token
    pub fn with_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "author".to_string(),
        );
        assert!(user.auth_token.is_none());
        assert_eq!(user.role, "author");
    }
}
