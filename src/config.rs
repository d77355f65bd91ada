use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// `DATABASE_URL` value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory:";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_limit_enabled: bool,
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_level: tracing::Level,
    pub username_warmup_days: u32,

    /// Both set: an admin with these credentials is created at startup if absent.
    pub bootstrap_admin: Option<(String, String)>,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_USERNAME"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(user), Ok(pass)) if !user.trim().is_empty() && !pass.is_empty() => {
                Some((user.trim().to_string(), pass))
            }
            _ => None,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", 900)?, // default 15 min

            rate_limit_enabled: parsed("RATE_LIMIT_ENABLED", true)?,
            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/erp".to_string()),
            log_level: parsed("LOG_LEVEL", tracing::Level::DEBUG)?,
            username_warmup_days: parsed("USERNAME_WARMUP_DAYS", 30)?,
            bootstrap_admin,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    /// Settings for tests and demos: memory store, no rate limiting.
    pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: MEMORY_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            rate_limit_enabled: false,
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/erp".to_string(),
            log_level: tracing::Level::DEBUG,
            username_warmup_days: 30,
            bootstrap_admin: None,
        }
    }
}
