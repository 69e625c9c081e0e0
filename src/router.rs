//! Client-side route table and guarded navigation.

use std::fmt::{Display, Formatter};

use crate::identity::{evaluate, GuardConfig, GuardDecision, Session};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Event(i64),
    CreateEvent,
    EditEvent(i64),
    MyEnrollments,
    NotFound(String),
}

impl Route {
    /// Parse an app path. Query strings, fragments and trailing slashes are ignored.
    pub fn parse(path: &str) -> Route {
        let bare = path.split(['?', '#']).next().unwrap_or("");
        let segs: Vec<&str> = bare.split('/').filter(|s| !s.is_empty()).collect();
        match segs.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["create"] => Route::CreateEvent,
            ["my-enrollments"] => Route::MyEnrollments,
            ["events", id] => id.parse().map(Route::Event).unwrap_or_else(|_| Route::NotFound(bare.to_string())),
            ["edit", id] => id.parse().map(Route::EditEvent).unwrap_or_else(|_| Route::NotFound(bare.to_string())),
            _ => Route::NotFound(bare.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Event(id) => format!("/events/{}", id),
            Route::CreateEvent => "/create".to_string(),
            Route::EditEvent(id) => format!("/edit/{}", id),
            Route::MyEnrollments => "/my-enrollments".to_string(),
            Route::NotFound(p) => p.clone(),
        }
    }

    /// Guard applied before rendering; `None` for public routes.
    pub fn guard(&self) -> Option<GuardConfig> {
        match self {
            Route::CreateEvent | Route::EditEvent(_) => Some(GuardConfig::ADMIN),
            Route::MyEnrollments => Some(GuardConfig::AUTHENTICATED),
            Route::Home | Route::Login | Route::Register | Route::Event(_) | Route::NotFound(_) => None,
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.path()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Session still loading; show a placeholder and decide later.
    Loading,
    Show(Route),
    /// Replaces the requested route, which is discarded.
    Redirect(Route),
}

pub fn navigate(path: &str, session: &Session) -> Navigation {
    let route = Route::parse(path);
    let Some(guard) = route.guard() else { return Navigation::Show(route); };
    match evaluate(session, guard) {
        GuardDecision::Loading => Navigation::Loading,
        GuardDecision::RedirectToLogin => Navigation::Redirect(Route::Login),
        GuardDecision::RedirectToHome => Navigation::Redirect(Route::Home),
        GuardDecision::Render => Navigation::Show(route),
    }
}
