pub mod memory;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewUser, User};

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

#[derive(Debug)]
pub enum StoreError {
    DuplicateIdentity(String),
    MissingIdentity,
    MissingSecret,
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateIdentity(email) => write!(f, "User already exists: {email}"),
            StoreError::MissingIdentity => write!(f, "Email is required"),
            StoreError::MissingSecret => write!(f, "Password hash is required"),
            StoreError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Persistence contract for user records and their pending reset token.
///
/// Every mutating call is a single atomic operation on one record. Concurrent
/// `set_reset_token` calls for the same user resolve last-writer-wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Replace any pending reset token on the record. Returns `false` if the
    /// record no longer exists.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Find the record whose email, token hash and unexpired token all match.
    async fn find_by_reset_token(
        &self,
        email: &str,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Store the new password hash and clear the reset token in one write,
    /// provided the token is still pending and unexpired. Returns `false`
    /// when the token was consumed or replaced in the meantime.
    async fn complete_reset(
        &self,
        id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

impl NewUser {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.email.trim().is_empty() {
            return Err(StoreError::MissingIdentity);
        }
        if self.password_hash.is_empty() {
            return Err(StoreError::MissingSecret);
        }
        Ok(())
    }
}
