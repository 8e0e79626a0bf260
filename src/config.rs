use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub host: IpAddr,
    pub port: u16,
    /// Public URL of the frontend that serves the reset form.
    pub base_url: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let base_url = env_required("FRONTEND_URL")?;

        let database_max_connections: u32 = env_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid DATABASE_MAX_CONNECTIONS: {e}"))?;

        let database_acquire_timeout = env_secs("DATABASE_ACQUIRE_TIMEOUT_SECS", "5")?;

        let host: IpAddr = env_or("HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid HOST: {e}"))?;

        let port: u16 = env_or("PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        let max_body_size: usize = env_or("MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("LOG_LEVEL", "info");

        let user = env_required("EMAIL_USER")?;
        let pass = env_required("EMAIL_PASS")?;
        let smtp = SmtpConfig {
            host: env_or("SMTP_HOST", "smtp.gmail.com"),
            port: env_or("SMTP_PORT", "587")
                .parse()
                .map_err(|e| format!("Invalid SMTP_PORT: {e}"))?,
            from: env_or("EMAIL_FROM", &user),
            timeout: env_secs("SMTP_TIMEOUT_SECS", "10")?,
            user,
            pass,
        };

        Ok(Config {
            database_url,
            database_max_connections,
            database_acquire_timeout,
            host,
            port,
            base_url,
            max_body_size,
            log_level,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secs(key: &str, default: &str) -> Result<Duration, String> {
    env_or(key, default)
        .parse()
        .map(Duration::from_secs)
        .map_err(|e| format!("Invalid {key}: {e}"))
}
