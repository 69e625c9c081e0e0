use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Authority literal that marks an administrator.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// A server-asserted authority attached to a confirmed session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleClaim {
    pub authority: String,
}

impl RoleClaim {
    pub fn new(authority: impl Into<String>) -> Self { Self { authority: authority.into() } }
    pub fn is_admin(&self) -> bool { self.authority == ROLE_ADMIN }
}

/// Body of the session-introspection endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<RoleClaim>,
}

impl Identity {
    pub fn is_admin(&self) -> bool { self.roles.iter().any(RoleClaim::is_admin) }
}

// Malformed claims are dropped rather than failing the whole body, so a bad entry can
// only ever cost admin rights, never grant them.
fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<RoleClaim>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(items) = raw else { return Ok(Vec::new()); };
    Ok(items
        .into_iter()
        .filter_map(|item| match item.get("authority") {
            Some(Value::String(a)) => Some(RoleClaim::new(a.clone())),
            _ => None,
        })
        .collect())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
