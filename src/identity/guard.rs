use super::session::Session;

/// What a guarded view demands of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GuardConfig {
    pub require_admin: bool,
}

impl GuardConfig {
    pub const AUTHENTICATED: GuardConfig = GuardConfig { require_admin: false };
    pub const ADMIN: GuardConfig = GuardConfig { require_admin: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardDecision {
    /// First confirmation still pending: show a placeholder, decide nothing.
    Loading,
    RedirectToLogin,
    RedirectToHome,
    Render,
}

/// Decide whether a guarded view may render. Checks run in a fixed order: loading,
/// authentication, then admin privilege.
pub fn evaluate(session: &Session, guard: GuardConfig) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Loading;
    }
    if !session.is_authenticated() {
        return GuardDecision::RedirectToLogin;
    }
    if guard.require_admin && !session.is_admin() {
        return GuardDecision::RedirectToHome;
    }
    GuardDecision::Render
}
