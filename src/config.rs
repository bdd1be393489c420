use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Evidence uploads
    pub upload_dir: String,
    pub public_base_url: String,
    pub max_evidence_bytes: usize,

    pub report_limit: u32,
    pub iot_history_limit: u32,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_iot_per_min: u32,

    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            api_prefix: or_default("API_PREFIX", "/api"),

            upload_dir: or_default("UPLOAD_DIR", "uploads"),
            public_base_url: or_default("PUBLIC_BASE_URL", "http://localhost:3001"),
            max_evidence_bytes: parse_or(&lookup, "MAX_EVIDENCE_BYTES", 5 * 1024 * 1024)?,

            report_limit: parse_or(&lookup, "REPORT_LIMIT", 500)?,
            iot_history_limit: parse_or(&lookup, "IOT_HISTORY_LIMIT", 20)?,

            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,
            rate_iot_per_min: parse_or(&lookup, "RATE_IOT_PER_MIN", 600)?,

            log_dir: or_default("LOG_DIR", "logs"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://unused".to_string(),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            upload_dir: "uploads".to_string(),
            public_base_url: "http://localhost:3001".to_string(),
            max_evidence_bytes: 1024,
            report_limit: 500,
            iot_history_limit: 3,
            rate_protected_per_min: 10_000,
            rate_iot_per_min: 10_000,
            log_dir: "logs".to_string(),
        }
    }
}
