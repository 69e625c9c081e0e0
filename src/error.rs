//! Unified client error model and mapping helpers.
//! Every failure the client can observe (transport, remote status codes, payload decoding,
//! local validation) is expressed as one `AppError` so views can decide uniformly whether to
//! surface it or absorb it into state.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// The request never completed (connect, timeout, TLS, body read).
    Network { code: String, message: String },
    /// Explicit rejection of credentials or of the current session.
    Auth { code: String, message: String },
    /// 404 on a resource fetch.
    NotFound { code: String, message: String },
    /// Any other non-2xx answer from the remote API.
    Server { code: String, status: u16, message: String },
    /// Local form validation, or a 400 carrying a server-side validation message.
    UserInput { code: String, message: String },
    /// 2xx answer whose body could not be decoded.
    Decode { code: String, message: String },
    Config { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Network { code, .. }
            | AppError::Auth { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Server { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Decode { code, .. }
            | AppError::Config { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Network { message, .. }
            | AppError::Auth { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Server { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Decode { message, .. }
            | AppError::Config { message, .. } => message.as_str(),
        }
    }

    pub fn network(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Network { code: code.into(), message: msg.into() } }
    pub fn auth(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn not_found(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn server(code: impl Into<String>, status: u16, msg: impl Into<String>) -> Self { AppError::Server { code: code.into(), status, message: msg.into() } }
    pub fn user(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn decode(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Decode { code: code.into(), message: msg.into() } }
    pub fn config(code: impl Into<String>, msg: impl Into<String>) -> Self { AppError::Config { code: code.into(), message: msg.into() } }

    /// Classify a non-2xx HTTP status from the remote API.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => AppError::UserInput { code: "bad_request".into(), message },
            401 => AppError::Auth { code: "unauthorized".into(), message },
            404 => AppError::NotFound { code: "not_found".into(), message },
            s => AppError::Server { code: "server_error".into(), status: s, message },
        }
    }

    /// HTTP status this error corresponds to; `None` when no response was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::Network { .. } | AppError::Decode { .. } | AppError::Config { .. } => None,
            AppError::Auth { .. } => Some(401),
            AppError::NotFound { .. } => Some(404),
            AppError::UserInput { .. } => Some(400),
            AppError::Server { status, .. } => Some(*status),
        }
    }

    pub fn is_auth(&self) -> bool { matches!(self, AppError::Auth { .. }) }
    pub fn is_not_found(&self) -> bool { matches!(self, AppError::NotFound { .. }) }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Server { code, status, message } => write!(f, "{} ({}): {}", code, status, message),
            other => write!(f, "{}: {}", other.code_str(), other.message()),
        }
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return AppError::Decode { code: "decode_error".into(), message: err.to_string() };
        }
        if let Some(status) = err.status() {
            return AppError::from_status(status.as_u16(), err.to_string());
        }
        if err.is_timeout() {
            return AppError::Network { code: "timeout".into(), message: err.to_string() };
        }
        AppError::Network { code: "network_error".into(), message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode { code: "decode_error".into(), message: err.to_string() }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Config { code: "config_error".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as a transport failure unless downcasted elsewhere
        if let Some(app) = err.downcast_ref::<AppError>() {
            return app.clone();
        }
        AppError::Network { code: "network_error".into(), message: err.to_string() }
    }
}
