use serde::Serialize;
use tracing::debug;

use super::{ensure_success, ApiClient};
use crate::error::{AppError, AppResult};
use crate::identity::{Identity, LoginRequest};

/// Account creation payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Build a registration, checking the form the way the sign-up page does before submitting.
    pub fn new(username: &str, email: &str, password: &str, confirm_password: &str) -> AppResult<Self> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(AppError::user("invalid_username", "username is required"));
        }
        if !email.contains('@') {
            return Err(AppError::user("invalid_email", format!("'{}' is not an email address", email)));
        }
        if password.is_empty() {
            return Err(AppError::user("invalid_password", "password is required"));
        }
        if password != confirm_password {
            return Err(AppError::user("password_mismatch", "passwords do not match"));
        }
        Ok(Self { username: username.to_string(), email: email.to_string(), password: password.to_string() })
    }
}

impl ApiClient {
    /// GET api/auth/me: who the current session cookie belongs to.
    pub async fn me(&self) -> AppResult<Identity> {
        self.get_json::<Identity>("api/auth/me").await
    }

    /// POST api/auth/login. A non-2xx answer is always an authentication failure here,
    /// whatever the status; the session cookie arrives as a side effect of success.
    pub async fn login(&self, req: &LoginRequest) -> AppResult<()> {
        let url = self.url("api/auth/login")?;
        debug!(target: "eventdesk::api", "POST {} user={}", url, req.username);
        let resp = self.http().post(url).json(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let reason = super::failure_message(status.as_u16(), &body);
            return Err(AppError::auth("login_failed", format!("Login failed: {}", reason)));
        }
        Ok(())
    }

    /// POST api/auth/logout.
    pub async fn logout(&self) -> AppResult<()> {
        let url = self.url("api/auth/logout")?;
        debug!(target: "eventdesk::api", "POST {}", url);
        let resp = self.http().post(url).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    /// POST api/auth/register.
    pub async fn register(&self, reg: &Registration) -> AppResult<()> {
        let url = self.url("api/auth/register")?;
        debug!(target: "eventdesk::api", "POST {} user={}", url, reg.username);
        let resp = self.http().post(url).json(reg).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }
}
