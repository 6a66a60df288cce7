use std::env;

use tracing::info;

use crate::error::{Result, TagnetError};

/// Public filter endpoint used when `STREAM_ENDPOINT` is unset.
pub const DEFAULT_STREAM_ENDPOINT: &str = "https://stream.twitter.com/1.1/statuses/filter.json";

/// Records fetched per run when `STREAM_DEFAULT_LIMIT` is unset.
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

/// Application configuration loaded from environment variables.
///
/// Built once at startup and passed to whatever needs it; nothing reads the
/// environment after that.
#[derive(Debug, Clone)]
pub struct Config {
    // Streaming
    pub stream_endpoint: String,
    pub stream_bearer_token: String,
    pub default_fetch_limit: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            stream_endpoint: env::var("STREAM_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_STREAM_ENDPOINT.to_string()),
            stream_bearer_token: required_env("STREAM_BEARER_TOKEN")?,
            default_fetch_limit: match env::var("STREAM_DEFAULT_LIMIT") {
                Ok(raw) => raw.parse().map_err(|_| {
                    TagnetError::Config(format!(
                        "STREAM_DEFAULT_LIMIT must be a number, got {raw:?}"
                    ))
                })?,
                Err(_) => DEFAULT_FETCH_LIMIT,
            },
        })
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            stream_endpoint = self.stream_endpoint.as_str(),
            stream_bearer_token = redact(&self.stream_bearer_token).as_str(),
            default_fetch_limit = self.default_fetch_limit,
            "Loaded configuration"
        );
    }
}

fn required_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(TagnetError::Config(format!(
            "{key} environment variable is required"
        ))),
    }
}

fn redact(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(len - 4).collect();
    format!("****{tail}")
}
