//! In-process stand-in for the event backend, served by axum on an ephemeral localhost port.
//! Sessions are cookie based (`sid`), like the real service.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use eventdesk::config::ClientConfig;
use eventdesk::events::Event;
use eventdesk::roster::EnrollmentRecord;
use eventdesk::AppContext;

#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: i64,
    pub password: String,
    pub email: String,
    pub admin: bool,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub users: HashMap<String, MockUser>,
    pub sessions: HashMap<String, String>,
    /// "METHOD /path" for every request, in arrival order.
    pub requests: Vec<String>,
    /// Forces the status of GET /api/auth/me.
    pub me_status: Option<u16>,
    /// Replaces the roles array returned by GET /api/auth/me.
    pub me_roles: Option<Value>,
    /// GET /api/auth/me answers 200 with this body verbatim.
    pub me_raw_body: Option<String>,
    /// GET /api/auth/me computes its answer on arrival, then holds it this long.
    pub me_delay_ms: Option<u64>,
    pub logout_status: Option<u16>,
    pub fail_delete: bool,
    pub events: Vec<Event>,
    pub enrollments: Vec<EnrollmentRecord>,
    next_id: i64,
}

impl MockState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<(String, MockUser)> {
        let sid = session_cookie(headers)?;
        let name = self.sessions.get(&sid)?;
        self.users.get(name).map(|u| (name.clone(), u.clone()))
    }

    pub fn add_user(&mut self, name: &str, password: &str, admin: bool) -> i64 {
        let id = self.next_id();
        self.users.insert(
            name.to_string(),
            MockUser { id, password: password.to_string(), email: format!("{}@example.org", name), admin },
        );
        id
    }

    pub fn add_event(&mut self, title: &str, capacity: i32) -> i64 {
        let id = self.next_id();
        self.events.push(Event {
            id,
            title: title.to_string(),
            description: format!("about {}", title),
            event_time: chrono::NaiveDate::from_ymd_opt(2025, 9, 1).and_then(|d| d.and_hms_opt(19, 0, 0)),
            capacity: Some(capacity),
            ..Default::default()
        });
        id
    }

    pub fn add_enrollment(&mut self, event_id: i64, username: &str, email: &str, when: &str) -> i64 {
        let id = self.next_id();
        let user_id = self.users.get(username).map(|u| u.id).unwrap_or(1000 + id);
        self.enrollments.push(EnrollmentRecord {
            id,
            event_id,
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            enrollment_time: when.to_string(),
        });
        if let Some(ev) = self.events.iter_mut().find(|e| e.id == event_id) {
            ev.current_enrollments += 1;
        }
        id
    }

    pub fn count(&self, request: &str) -> usize { self.requests.iter().filter(|r| *r == request).count() }
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub state: Shared,
    pub base: String,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> MockServer {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock server error: {e:?}");
            }
        });
        MockServer { state, base: format!("http://{}", addr), handle }
    }

    pub fn config(&self) -> ClientConfig { ClientConfig::for_base(&self.base).expect("mock base url") }

    /// Fresh client context (own cookie jar), not yet confirmed.
    pub fn context(&self) -> AppContext { AppContext::new(self.config()).expect("context") }

    pub fn requests(&self) -> Vec<String> { self.state.lock().requests.clone() }
}

impl Drop for MockServer {
    fn drop(&mut self) { self.handle.abort(); }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/register", post(register))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{id}", get(get_event).put(update_event).delete(delete_event))
        .route("/api/enrollments/event/{id}", get(event_roster))
        .route("/api/enrollments/admin/{event_id}/{user_id}", delete(admin_remove))
        .route("/api/enrollments/my-enrollments", get(my_enrollments))
        .route("/api/enrollments/{id}", post(enroll).delete(unenroll))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(st): State<Shared>, req: Request, next: Next) -> Response {
    st.lock().requests.push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|kv| kv.trim().strip_prefix("sid=").map(str::to_string))
        .next()
}

fn fail(status: StatusCode, msg: &str) -> Response { (status, Json(json!({ "error": msg }))).into_response() }

fn status_of(code: u16) -> StatusCode { StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR) }

async fn login(State(st): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = st.lock();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();
    if !s.users.get(&username).is_some_and(|u| u.password == password) {
        return fail(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let sid = format!("sid-{}", s.next_id());
    s.sessions.insert(sid.clone(), username);
    (
        [(header::SET_COOKIE, format!("sid={}; HttpOnly; Path=/", sid))],
        Json(json!({ "message": "Login successful" })),
    )
        .into_response()
}

async fn me(State(st): State<Shared>, headers: HeaderMap) -> Response {
    let (resp, delay) = {
        let s = st.lock();
        (me_answer(&s, &headers), s.me_delay_ms)
    };
    if let Some(ms) = delay {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
    resp
}

fn me_answer(s: &MockState, headers: &HeaderMap) -> Response {
    if let Some(body) = &s.me_raw_body {
        return (StatusCode::OK, body.clone()).into_response();
    }
    if let Some(code) = s.me_status {
        return fail(status_of(code), "forced");
    }
    let Some((name, user)) = s.user_for(headers) else { return fail(StatusCode::UNAUTHORIZED, "Not authenticated"); };
    let roles = match &s.me_roles {
        Some(r) => r.clone(),
        None if user.admin => json!([{ "authority": "ROLE_USER" }, { "authority": "ROLE_ADMIN" }]),
        None => json!([{ "authority": "ROLE_USER" }]),
    };
    Json(json!({ "username": name, "roles": roles })).into_response()
}

async fn logout(State(st): State<Shared>, headers: HeaderMap) -> Response {
    let mut s = st.lock();
    if let Some(code) = s.logout_status {
        return fail(status_of(code), "logout failed");
    }
    if let Some(sid) = session_cookie(&headers) {
        s.sessions.remove(&sid);
    }
    Json(json!({ "message": "Logged out" })).into_response()
}

async fn register(State(st): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = st.lock();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if s.users.contains_key(&username) {
        return fail(StatusCode::BAD_REQUEST, "Username already exists");
    }
    let id = s.next_id();
    s.users.insert(
        username,
        MockUser {
            id,
            password: body["password"].as_str().unwrap_or_default().to_string(),
            email: body["email"].as_str().unwrap_or_default().to_string(),
            admin: false,
        },
    );
    Json(json!({ "message": "User registered" })).into_response()
}

async fn list_events(State(st): State<Shared>) -> Response { Json(st.lock().events.clone()).into_response() }

async fn get_event(State(st): State<Shared>, Path(id): Path<i64>) -> Response {
    match st.lock().events.iter().find(|e| e.id == id) {
        Some(ev) => Json(ev.clone()).into_response(),
        None => fail(StatusCode::NOT_FOUND, "Event not found"),
    }
}

async fn create_event(State(st): State<Shared>, headers: HeaderMap, mut form: Multipart) -> Response {
    let admin = st.lock().user_for(&headers).map(|(_, u)| u.admin);
    match admin {
        None => return fail(StatusCode::UNAUTHORIZED, "Not authenticated"),
        Some(false) => return fail(StatusCode::FORBIDDEN, "Admin only"),
        Some(true) => {}
    }
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut image: Option<String> = None;
    while let Ok(Some(field)) = form.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            image = field.file_name().map(str::to_string);
            let _ = field.bytes().await;
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }
    let event_time = fields
        .get("eventTime")
        .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.naive_utc());
    let mut s = st.lock();
    let ev = Event {
        id: s.next_id(),
        title: fields.get("title").cloned().unwrap_or_default(),
        description: fields.get("description").cloned().unwrap_or_default(),
        description_markdown: fields.get("descriptionMarkdown").cloned(),
        capacity: fields.get("capacity").and_then(|c| c.parse().ok()),
        image_url: image.map(|f| format!("/uploads/{}", f)),
        event_time,
        current_enrollments: 0,
    };
    s.events.push(ev.clone());
    Json(ev).into_response()
}

async fn update_event(State(st): State<Shared>, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    let mut s = st.lock();
    let Some(ev) = s.events.iter_mut().find(|e| e.id == id) else { return fail(StatusCode::NOT_FOUND, "Event not found"); };
    if let Some(t) = body["title"].as_str() {
        ev.title = t.to_string();
    }
    if let Some(d) = body["description"].as_str() {
        ev.description = d.to_string();
    }
    if let Some(c) = body["capacity"].as_i64() {
        ev.capacity = Some(c as i32);
    }
    if let Some(t) = body["eventTime"].as_str() {
        ev.event_time = chrono::NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S").ok();
    }
    Json(ev.clone()).into_response()
}

async fn delete_event(State(st): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut s = st.lock();
    let before = s.events.len();
    s.events.retain(|e| e.id != id);
    if s.events.len() == before {
        return fail(StatusCode::NOT_FOUND, "Event not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn event_roster(State(st): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let s = st.lock();
    match s.user_for(&headers) {
        Some((_, u)) if u.admin => {}
        Some(_) => return fail(StatusCode::FORBIDDEN, "Admin only"),
        None => return fail(StatusCode::UNAUTHORIZED, "Not authenticated"),
    }
    if !s.events.iter().any(|e| e.id == id) {
        return fail(StatusCode::NOT_FOUND, "Event not found");
    }
    let rows: Vec<EnrollmentRecord> = s.enrollments.iter().filter(|r| r.event_id == id).cloned().collect();
    Json(rows).into_response()
}

async fn admin_remove(State(st): State<Shared>, Path((event_id, user_id)): Path<(i64, i64)>) -> Response {
    let mut s = st.lock();
    if s.fail_delete {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "delete failed");
    }
    s.enrollments.retain(|r| !(r.event_id == event_id && r.user_id == user_id));
    StatusCode::NO_CONTENT.into_response()
}

async fn enroll(State(st): State<Shared>, headers: HeaderMap, Path(event_id): Path<i64>) -> Response {
    let mut s = st.lock();
    let Some((name, user)) = s.user_for(&headers) else { return fail(StatusCode::UNAUTHORIZED, "Not authenticated"); };
    let Some(ev) = s.events.iter().find(|e| e.id == event_id).cloned() else {
        return fail(StatusCode::NOT_FOUND, "Event not found");
    };
    if ev.is_full() {
        return fail(StatusCode::BAD_REQUEST, "Event is full");
    }
    if s.enrollments.iter().any(|r| r.event_id == event_id && r.user_id == user.id) {
        return fail(StatusCode::BAD_REQUEST, "Already enrolled");
    }
    let id = s.add_enrollment(event_id, &name, &user.email, "2025-08-01T10:00:00");
    let event = s.events.iter().find(|e| e.id == event_id).cloned();
    Json(json!({ "id": id, "enrollmentTime": "2025-08-01T10:00:00", "event": event })).into_response()
}

async fn unenroll(State(st): State<Shared>, headers: HeaderMap, Path(event_id): Path<i64>) -> Response {
    let mut s = st.lock();
    let Some((_, user)) = s.user_for(&headers) else { return fail(StatusCode::UNAUTHORIZED, "Not authenticated"); };
    let before = s.enrollments.len();
    s.enrollments.retain(|r| !(r.event_id == event_id && r.user_id == user.id));
    if s.enrollments.len() == before {
        return fail(StatusCode::NOT_FOUND, "Not enrolled");
    }
    if let Some(ev) = s.events.iter_mut().find(|e| e.id == event_id) {
        ev.current_enrollments -= 1;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn my_enrollments(State(st): State<Shared>, headers: HeaderMap) -> Response {
    let s = st.lock();
    let Some((_, user)) = s.user_for(&headers) else { return fail(StatusCode::UNAUTHORIZED, "Not authenticated"); };
    let items: Vec<Value> = s
        .enrollments
        .iter()
        .filter(|r| r.user_id == user.id)
        .map(|r| {
            let event = s.events.iter().find(|e| e.id == r.event_id);
            json!({ "id": r.id, "enrollmentTime": r.enrollment_time, "event": event })
        })
        .collect();
    Json(items).into_response()
}
