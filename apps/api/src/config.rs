use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed numbers abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub port: u16,
    /// Upper bound on a single answer evaluation round-trip.
    pub evaluation_timeout: Duration,
    /// How often the screening snapshot is re-fetched from the backend.
    pub refresh_interval: Duration,
    /// Bound on match creation and auto-screening, which run LLM calls per pair.
    pub screening_timeout: Duration,
    /// Sessions untouched for this long are expired.
    pub session_idle_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            evaluation_timeout: secs_from_env("EVALUATION_TIMEOUT_SECS", 30)?,
            refresh_interval: secs_from_env("REFRESH_INTERVAL_SECS", 30)?,
            screening_timeout: secs_from_env("SCREENING_TIMEOUT_SECS", 600)?,
            session_idle_timeout: secs_from_env("SESSION_IDLE_TIMEOUT_SECS", 1800)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn secs_from_env(key: &str, default: u64) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => parse_secs(key, &raw),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds"))?;
    anyhow::ensure!(secs > 0, "{key} must be greater than zero");
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secs_accepts_padded_value() {
        assert_eq!(
            parse_secs("EVALUATION_TIMEOUT_SECS", " 45 ").unwrap(),
            Duration::from_secs(45)
        );
    }

    #[test]
    fn test_parse_secs_rejects_zero() {
        let err = parse_secs("REFRESH_INTERVAL_SECS", "0").unwrap_err();
        assert!(err.to_string().contains("REFRESH_INTERVAL_SECS"));
    }

    #[test]
    fn test_parse_secs_rejects_garbage() {
        assert!(parse_secs("EVALUATION_TIMEOUT_SECS", "soon").is_err());
    }
}
