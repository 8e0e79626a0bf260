use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User};

/// In-process [`UserStore`] keyed by id, with a unique email index.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<Uuid, User>,
    /// email -> id
    emails: DashMap<String, Uuid>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn token_matches(user: &User, token_hash: &str, now: DateTime<Utc>) -> bool {
    match (&user.reset_token_hash, user.reset_token_expires_at) {
        (Some(stored), Some(expires_at)) => {
            bool::from(stored.as_bytes().ct_eq(token_hash.as_bytes())) && expires_at > now
        }
        _ => false,
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        user.validate()?;

        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateIdentity(user.email)),
            Entry::Vacant(slot) => {
                let record = User {
                    id: Uuid::now_v7(),
                    email: user.email,
                    password_hash: user.password_hash,
                    reset_token_hash: None,
                    reset_token_expires_at: None,
                    created_at: Utc::now(),
                };
                self.users.insert(record.id, record.clone());
                slot.insert(record.id);
                Ok(record)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(mut user) = self.users.get_mut(&id) else {
            return Ok(false);
        };
        user.reset_token_hash = Some(token_hash.to_string());
        user.reset_token_expires_at = Some(expires_at);
        Ok(true)
    }

    async fn find_by_reset_token(
        &self,
        email: &str,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .find_by_email(email)
            .await?
            .filter(|user| token_matches(user, token_hash, now)))
    }

    async fn complete_reset(
        &self,
        id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(mut user) = self.users.get_mut(&id) else {
            return Ok(false);
        };
        if !token_matches(&user, token_hash, now) {
            return Ok(false);
        }
        user.password_hash = password_hash.to_string();
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        Ok(true)
    }
}
