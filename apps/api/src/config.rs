use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub anthropic_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    /// Upper bound on a single generation call.
    pub llm_timeout: Duration,
    pub dispatch_queue_capacity: usize,
    pub dispatch_concurrency: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10u32)?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 90u64)?),
            dispatch_queue_capacity: parse_env("DISPATCH_QUEUE_CAPACITY", 256usize)?,
            dispatch_concurrency: parse_env("DISPATCH_CONCURRENCY", 4usize)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10_345_660usize)?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
