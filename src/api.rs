//!
//! eventdesk API client
//! --------------------
//! Thin typed wrapper over the remote event service's HTTP API.
//!
//! Responsibilities:
//! - One `reqwest::Client` with a cookie store, so the session cookie set by login is replayed
//!   on every later request (the browser's `credentials: "include"`).
//! - Joining endpoint paths onto the configured base URL.
//! - Mapping non-2xx answers onto `AppError`, using the server's `{"error": ...}` body as the
//!   message when one is present.
//!
//! Endpoint groups live in sub-modules: `auth`, `events`, `enrollments`.

use std::time::Duration;

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};

pub mod auth;
pub mod enrollments;
pub mod events;

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base", &self.base.as_str()).finish()
    }
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| AppError::config("http_client", &e.to_string()))?;
        Ok(Self { base: cfg.api_base.clone(), client })
    }

    pub fn base(&self) -> &Url { &self.base }

    /// Resolve an endpoint path (`api/...`, no leading slash) against the base URL.
    pub(crate) fn url(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::config("bad_endpoint", &format!("{}: {}", path, e)))
    }

    pub(crate) fn http(&self) -> &reqwest::Client { &self.client }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = self.url(path)?;
        debug!(target: "eventdesk::api", "GET {}", url);
        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> AppResult<()> {
        let url = self.url(path)?;
        debug!(target: "eventdesk::api", "DELETE {}", url);
        let resp = self.client.delete(url).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }
}

/// Pass 2xx responses through; turn anything else into an `AppError`.
pub(crate) async fn ensure_success(resp: Response) -> AppResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::from_status(status.as_u16(), failure_message(status.as_u16(), &body)))
}

/// Prefer the server's `error`/`message` field; fall back to the raw body, then the status line.
pub(crate) fn failure_message(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = v.get(key).and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 {
        return trimmed.to_string();
    }
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed");
    format!("HTTP {}: {}", status, reason)
}
