use tracing::info;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::AppResult;
use crate::identity::{Session, SessionState};
use crate::router::{navigate, Navigation};

/// Everything a view needs, built once at start-up and passed down by reference.
pub struct AppContext {
    config: ClientConfig,
    api: ApiClient,
    session: SessionState,
}

impl AppContext {
    /// Build the context without contacting the server; the session starts out loading.
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let api = ApiClient::new(&config)?;
        let session = SessionState::new(api.clone());
        Ok(Self { config, api, session })
    }

    /// Build the context and run the first session confirmation.
    pub async fn start(config: ClientConfig) -> AppResult<Self> {
        let ctx = Self::new(config)?;
        ctx.session.confirm().await;
        let s = ctx.session.snapshot();
        info!(
            target: "eventdesk",
            "eventdesk started: api='{}', authenticated={}, admin={}",
            ctx.config.api_base, s.is_authenticated(), s.is_admin()
        );
        Ok(ctx)
    }

    pub fn config(&self) -> &ClientConfig { &self.config }
    pub fn api(&self) -> &ApiClient { &self.api }
    pub fn session(&self) -> &SessionState { &self.session }

    pub fn snapshot(&self) -> Session { self.session.snapshot() }

    /// Guarded navigation against the current session.
    pub fn navigate(&self, path: &str) -> Navigation { navigate(path, &self.session.snapshot()) }
}
