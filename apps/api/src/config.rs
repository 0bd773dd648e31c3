use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub oracle_timeout: Duration,
    pub oracle_max_attempts: u32,
    /// Budget for the whole profile update unit of work, oracle call included.
    pub profile_update_timeout: Duration,
    pub auth_jwt_secret: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_MODEL.to_string()),
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_API_BASE.to_string()),
            oracle_timeout: Duration::from_secs(parse_env("ORACLE_TIMEOUT_SECS", 8)?),
            oracle_max_attempts: parse_env("ORACLE_MAX_ATTEMPTS", 1)?,
            profile_update_timeout: Duration::from_secs(parse_env(
                "PROFILE_UPDATE_TIMEOUT_SECS",
                10,
            )?),
            auth_jwt_secret: require_env("AUTH_JWT_SECRET")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for in-process tests; nothing here is dialed.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/career_test".to_string(),
            db_max_connections: 1,
            gemini_api_key: "test-key".to_string(),
            gemini_model: crate::llm_client::DEFAULT_MODEL.to_string(),
            gemini_api_base: crate::llm_client::DEFAULT_API_BASE.to_string(),
            oracle_timeout: Duration::from_secs(2),
            oracle_max_attempts: 1,
            profile_update_timeout: Duration::from_secs(10),
            auth_jwt_secret: "test-secret".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
