use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use recovery_service::config::{Config, SmtpConfig};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use recovery_service::db::{MemoryUserStore, StoreError, UserStore};
use recovery_service::email::{Notifier, NotifyError};
use recovery_service::models::{NewUser, User};
use recovery_service::recovery::password;

pub const BASE_URL: &str = "https://frontend.test";

#[derive(Debug, Clone)]
pub struct SentLink {
    pub to: String,
    pub url: String,
}

impl SentLink {
    pub fn query(&self, key: &str) -> Option<String> {
        let (_, query) = self.url.split_once('?')?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    pub fn token(&self) -> String {
        self.query("token").expect("link has no token")
    }
}

/// Notifier that records every link instead of mailing it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentLink>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentLink> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> SentLink {
        self.sent().pop().expect("no link was sent")
    }

    pub fn fail_next_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_password_reset(&self, to_email: &str, reset_url: &str) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::from("SMTP relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(SentLink {
            to: to_email.to_string(),
            url: reset_url.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum StoreFault {
    /// Every call returns a database error.
    Unavailable,
    /// Every call panics.
    Panic,
}

/// Store whose every operation fails the same way.
pub struct FaultyUserStore {
    fault: StoreFault,
}

impl FaultyUserStore {
    pub fn new(fault: StoreFault) -> Self {
        Self { fault }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        match self.fault {
            StoreFault::Unavailable => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
            StoreFault::Panic => panic!("user store crashed"),
        }
    }
}

#[async_trait]
impl UserStore for FaultyUserStore {
    async fn create(&self, _user: NewUser) -> Result<User, StoreError> {
        self.fail()
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        self.fail()
    }

    async fn set_reset_token(
        &self,
        _id: Uuid,
        _token_hash: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn find_by_reset_token(
        &self,
        _email: &str,
        _token_hash: &str,
        _now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        self.fail()
    }

    async fn complete_reset(
        &self,
        _id: Uuid,
        _token_hash: &str,
        _password_hash: &str,
        _now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.fail()
    }
}

/// A running test server. Backed by an in-memory store unless spawned with
/// [`spawn_app_with_store`].
pub struct TestApp<S = MemoryUserStore> {
    pub addr: SocketAddr,
    pub client: Client,
    pub users: Arc<S>,
    pub notifier: Arc<RecordingNotifier>,
}

impl<S: UserStore + 'static> TestApp<S> {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Insert a user with the given plaintext password.
    pub async fn seed_user(&self, email: &str, password: &str) -> User {
        let password_hash = password::hash(password).unwrap();
        self.users
            .create(NewUser {
                email: email.to_string(),
                password_hash,
            })
            .await
            .expect("seed user failed")
    }

    pub async fn user(&self, email: &str) -> User {
        self.users
            .find_by_email(email)
            .await
            .unwrap()
            .expect("user missing")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn request_link(&self, email: &str) -> (Value, StatusCode) {
        self.post_json(
            "/Website/send_forgot_password_recovery_link",
            &json!({ "email": email }),
        )
        .await
    }

    pub async fn reset(&self, email: &str, token: &str, new_password: &str) -> (Value, StatusCode) {
        self.post_json(
            "/Website/reset_password",
            &json!({ "token": token, "email": email, "newPassword": new_password }),
        )
        .await
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "memory".to_string(),
        database_max_connections: 1,
        database_acquire_timeout: Duration::from_secs(1),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: BASE_URL.to_string(),
        max_body_size: 4096,
        log_level: "warn".to_string(),
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            user: "mailer@frontend.test".to_string(),
            pass: "unused".to_string(),
            from: "mailer@frontend.test".to_string(),
            timeout: Duration::from_secs(1),
        },
    }
}

/// Spawn the router on a random port with fresh in-memory collaborators.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_store(Arc::new(MemoryUserStore::new())).await
}

/// Spawn the router on a random port around the given store.
pub async fn spawn_app_with_store<S: UserStore + 'static>(users: Arc<S>) -> TestApp<S> {
    let notifier = Arc::new(RecordingNotifier::default());

    let app = recovery_service::build_app(test_config(), users.clone(), notifier.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        users,
        notifier,
    }
}
