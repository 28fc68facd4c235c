// Client configuration: where to send requests and how to identify
// ourselves. Values come from CLI flags first, then the environment, then
// the built-in defaults below.

use std::time::Duration;

use reqwest::Url;

use crate::error::ApiError;

pub const DEFAULT_HOST: &str = "https://scrapbox.io";
pub const DEFAULT_USER_AGENT: &str = "Scrapgox/0.1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_BASE_URL: &str = "SCRAPGOX_BASE_URL";
pub const ENV_USER_AGENT: &str = "SCRAPGOX_USER_AGENT";
pub const ENV_TOKEN: &str = "SCRAPGOX_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "SCRAPGOX_TIMEOUT_SECS";

/// Immutable settings for a `ScrapboxClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// Value of the `connect.sid` session cookie. Never empty when `Some`.
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Parse `base_url` and build a config with the default timeout.
    /// An empty token is treated the same as no token.
    pub fn new(base_url: &str, token: Option<String>, user_agent: impl Into<String>) -> Result<Self, ApiError> {
        Ok(ClientConfig {
            base_url: parse_base_url(base_url)?,
            token: token.filter(|t| !t.is_empty()),
            user_agent: user_agent.into(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Build a config from the `SCRAPGOX_*` variables returned by `lookup`
    /// (the process environment in the binary), falling back to the
    /// defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let user_agent = lookup(ENV_USER_AGENT).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let config = Self::new(&base_url, lookup(ENV_TOKEN), user_agent)?;

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_timeout_secs(&raw)?,
            None => config.timeout,
        };
        Ok(config.with_timeout(timeout))
    }

    /// `None` disables the transport timeout. Zero is treated as `None`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "expected an http(s) url".into(),
        });
    }
    Ok(url)
}

fn parse_timeout_secs(raw: &str) -> Result<Option<Duration>, ApiError> {
    let secs: u64 = raw.trim().parse().map_err(|_| ApiError::Config(format!(
        "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got `{raw}`"
    )))?;
    Ok(Some(Duration::from_secs(secs)).filter(|t| !t.is_zero()))
}
