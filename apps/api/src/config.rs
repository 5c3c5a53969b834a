use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::auth::jwt::JwtConfig;

const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_CONCURRENT_PARSES: usize = 4;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Upload archive settings; `None` disables archiving of original files.
    pub s3: Option<S3Settings>,
    /// Optional vocabulary override. Defaults to the embedded `config/vocabulary.toml`.
    pub vocabulary_path: Option<PathBuf>,
    /// Wall-clock budget for parsing a single uploaded document.
    pub extraction_timeout: Duration,
    /// Upper bound on documents parsed at the same time.
    pub max_concurrent_parses: usize,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secret = require_env("JWT_SECRET")?;
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let max_concurrent_parses =
            parse_env("MAX_CONCURRENT_PARSES", DEFAULT_MAX_CONCURRENT_PARSES)?;
        anyhow::ensure!(
            max_concurrent_parses > 0,
            "MAX_CONCURRENT_PARSES must be at least 1"
        );

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            jwt: JwtConfig {
                secret,
                expiry_hours: parse_env("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS)?,
            },
            s3: S3Settings::from_env(),
            vocabulary_path: optional_env("VOCABULARY_PATH").map(PathBuf::from),
            extraction_timeout: Duration::from_secs(parse_env(
                "EXTRACTION_TIMEOUT_SECS",
                DEFAULT_EXTRACTION_TIMEOUT_SECS,
            )?),
            max_concurrent_parses,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl S3Settings {
    /// All four variables must be present; a partial set leaves archiving off.
    fn from_env() -> Option<Self> {
        Some(S3Settings {
            bucket: optional_env("S3_BUCKET")?,
            endpoint: optional_env("S3_ENDPOINT")?,
            access_key_id: optional_env("AWS_ACCESS_KEY_ID")?,
            secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
