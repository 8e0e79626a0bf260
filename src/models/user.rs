use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// SHA-256 of the pending reset token. Set together with `reset_token_expires_at`.
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_pending_reset(&self) -> bool {
        self.reset_token_hash.is_some()
    }
}

/// Input for inserting a user record. Records are provisioned outside the
/// recovery flow; the store checks the record invariants on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}
