use bcrypt::BcryptError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::config::config;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash (`$2b$<cost>$<salt+digest>`)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Malformed stored hashes never verify
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Build a user record, hashing the plain password
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
    ) -> Result<Self, BcryptError> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password_hash: hash_password(password)?,
        })
    }
}

/// Hash with the configured bcrypt cost; bcrypt generates the salt
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, config().auth.bcrypt_cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(password: &str) -> User {
        let new = NewUser::new("alice", "alice@example.com", password).unwrap();
        User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn verifies_matching_password() {
        let user = user_with("hunter2");
        assert!(user.verify_password("hunter2"));
        assert!(!user.verify_password("hunter3"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$2"));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let mut user = user_with("secret");
        user.password_hash = "not-a-bcrypt-hash".to_string();
        assert!(!user.verify_password("secret"));
    }
}
