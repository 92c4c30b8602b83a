use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::FixedOffset;
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Base URL of the upstream API; `/graphql` is appended by the client.
    pub graphql_endpoint: String,
    pub api_prefix: String,
    pub upstream_timeout: Duration,

    // Rate limiting
    pub rate_login_per_min: u32,

    pub cookie_secure: bool,
    /// Offset used to read record timestamps as school-local wall-clock time.
    pub utc_offset: FixedOffset,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let graphql_endpoint = lookup("GRAPHQL_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .context("GRAPHQL_ENDPOINT must be set")?;

        let offset_hours: i32 = parse_or(&lookup, "PORTAL_UTC_OFFSET_HOURS", "7")?;
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
            .with_context(|| format!("PORTAL_UTC_OFFSET_HOURS out of range: {offset_hours}"))?;

        let timeout_secs: u64 = parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", "15")?;

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            graphql_endpoint,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            upstream_timeout: Duration::from_secs(timeout_secs),
            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", "30")?,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", "false")?,
            utc_offset,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&lookup, "LOG_LEVEL", "info")?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("{key} has invalid value {raw:?}: {e}"))
}
