use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::auth::Registration;
use crate::api::ApiClient;
use crate::error::AppResult;

use super::principal::{Identity, LoginRequest};

/// The client's belief about who is signed in.
///
/// Fields are private: admin without authentication cannot be expressed, and only
/// [`SessionState`] produces values after start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
    is_admin: bool,
    username: Option<String>,
    loading: bool,
}

impl Default for Session {
    fn default() -> Self { Self::loading() }
}

impl Session {
    /// Start-up state: nothing confirmed yet.
    pub fn loading() -> Self { Self { authenticated: false, is_admin: false, username: None, loading: true } }

    pub fn anonymous() -> Self { Self { authenticated: false, is_admin: false, username: None, loading: false } }

    pub fn user(username: impl Into<String>) -> Self {
        Self { authenticated: true, is_admin: false, username: Some(username.into()), loading: false }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self { authenticated: true, is_admin: true, username: Some(username.into()), loading: false }
    }

    fn confirmed(identity: &Identity) -> Self {
        Self { authenticated: true, is_admin: identity.is_admin(), username: identity.username.clone(), loading: false }
    }

    pub fn is_authenticated(&self) -> bool { self.authenticated }
    pub fn is_admin(&self) -> bool { self.is_admin }
    pub fn username(&self) -> Option<&str> { self.username.as_deref() }
    pub fn is_loading(&self) -> bool { self.loading }
}

/// Single source of truth for the session, refreshed from the remote service.
///
/// Written only by `confirm`, `login` and `logout`; everything else reads snapshots or
/// subscribes for changes. Each confirmation and logout takes a new generation; a
/// confirmation result is applied only if no later one was issued in the meantime.
pub struct SessionState {
    api: ApiClient,
    tx: watch::Sender<Session>,
    generation: AtomicU64,
}

impl SessionState {
    pub fn new(api: ApiClient) -> Self {
        let (tx, _rx) = watch::channel(Session::loading());
        Self { api, tx, generation: AtomicU64::new(0) }
    }

    fn next_generation(&self) -> u64 { self.generation.fetch_add(1, Ordering::SeqCst) + 1 }

    pub fn snapshot(&self) -> Session { self.tx.borrow().clone() }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> { self.tx.subscribe() }

    /// Ask the server who we are. Never fails: any error becomes the signed-out state.
    /// The last call issued wins; an answer overtaken by a later confirm or logout is dropped.
    pub async fn confirm(&self) {
        let generation = self.next_generation();
        let next = match self.api.me().await {
            Ok(identity) => {
                debug!(
                    target: "eventdesk::session",
                    "confirmed user={:?} roles={}", identity.username, identity.roles.len()
                );
                Session::confirmed(&identity)
            }
            Err(e) => {
                warn!(target: "eventdesk::session", "session confirmation failed: {}", e);
                Session::anonymous()
            }
        };
        let applied = self.tx.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = next;
            true
        });
        if !applied {
            debug!(target: "eventdesk::session", "discarding superseded confirmation generation={}", generation);
        }
    }

    /// Log in, then re-confirm before returning. The login response itself is not trusted
    /// for role claims. On rejection the session is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<()> {
        let req = LoginRequest { username: username.to_string(), password: password.to_string() };
        if let Err(e) = self.api.login(&req).await {
            warn!(target: "eventdesk::session", "login rejected for user={}: {}", username, e);
            return Err(e);
        }
        self.confirm().await;
        let s = self.snapshot();
        info!(
            target: "eventdesk",
            "login user={} authenticated={} admin={}",
            username, s.is_authenticated(), s.is_admin()
        );
        Ok(())
    }

    /// Best-effort server notification; local state always clears. Any confirmation still in
    /// flight is superseded, so the signed-out state is final.
    pub async fn logout(&self) {
        self.next_generation();
        if let Err(e) = self.api.logout().await {
            warn!(target: "eventdesk::session", "logout request failed: {}", e);
        }
        self.tx.send_modify(|s| {
            s.authenticated = false;
            s.is_admin = false;
            s.username = None;
            s.loading = false;
        });
        info!(target: "eventdesk", "logged out");
    }

    /// Create an account. Does not sign in and does not touch the session.
    pub async fn register(&self, reg: &Registration) -> AppResult<()> {
        self.api.register(reg).await?;
        info!(target: "eventdesk", "registered user={}", reg.username);
        Ok(())
    }
}
