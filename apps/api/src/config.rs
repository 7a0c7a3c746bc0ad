use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_FALLBACK_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_base_url: String,
    pub ai_api_key: String,
    pub ai_model: String,
    /// `None` disables the fallback attempt.
    pub ai_fallback_model: Option<String>,
    pub ai_max_tokens: Option<u32>,
    pub ai_timeout: Duration,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai_api_key = get("AI_API_KEY")
            .with_context(|| "Required environment variable 'AI_API_KEY' is not set")?;

        let ai_base_url = get("AI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let ai_model = get("AI_MODEL")
            .map(|m| m.trim().to_string())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        // An explicitly empty AI_FALLBACK_MODEL turns the fallback off.
        let ai_fallback_model = match lookup("AI_FALLBACK_MODEL") {
            Some(m) if m.trim().is_empty() => None,
            Some(m) => Some(m.trim().to_string()),
            None => Some(DEFAULT_FALLBACK_MODEL.to_string()),
        };

        let ai_max_tokens = get("AI_MAX_TOKENS")
            .map(|v| parse_positive::<u32>("AI_MAX_TOKENS", &v))
            .transpose()?;

        let ai_timeout = get("AI_TIMEOUT_MS")
            .map(|v| parse_positive::<u64>("AI_TIMEOUT_MS", &v))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS));

        let allowed_origins = parse_origins(&get("ALLOWED_ORIGIN").unwrap_or_else(|| "*".into()))?;

        Ok(Config {
            ai_base_url,
            ai_api_key,
            ai_model,
            ai_fallback_model,
            ai_max_tokens,
            ai_timeout,
            allowed_origins,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("{key} must be a positive integer, got '{raw}'"))?;
    if value <= T::default() {
        bail!("{key} must be a positive integer, got '{raw}'");
    }
    Ok(value)
}

/// Splits a comma-separated origin list, dropping blank entries. Every entry
/// must be usable as an `Access-Control-Allow-Origin` value.
pub fn parse_origins(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .with_context(|| format!("ALLOWED_ORIGIN contains an invalid origin '{origin}'"))
        })
        .collect()
}
