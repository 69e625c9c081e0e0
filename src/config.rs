use reqwest::Url;
use thiserror::Error;

pub const ENV_API_BASE: &str = "EVENTDESK_API_BASE";
pub const ENV_TIMEOUT_MS: &str = "EVENTDESK_TIMEOUT_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("invalid timeout '{0}': expected a positive number of milliseconds")]
    InvalidTimeout(String),
}

/// Settings for talking to the remote event API.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the API; always stored with a trailing slash so relative joins keep any path prefix.
    pub api_base: Url,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse("http://localhost:8080/").expect("default API base is a valid URL"),
            timeout_ms: 10_000,
            user_agent: format!("eventdesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Default settings pointed at `base`.
    pub fn for_base(base: &str) -> Result<Self, ConfigError> {
        Ok(Self { api_base: parse_base(base)?, ..Self::default() })
    }

    /// Defaults overridden by `EVENTDESK_API_BASE` and `EVENTDESK_TIMEOUT_MS` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            cfg.api_base = parse_base(&base)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS).filter(|v| !v.trim().is_empty()) {
            cfg.timeout_ms = parse_timeout(&raw)?;
        }
        Ok(cfg)
    }

    pub fn with_base(mut self, base: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_base(base)?;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.timeout_ms = parse_timeout(raw)?;
        Ok(self)
    }
}

fn parse_base(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let mut url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        value: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
