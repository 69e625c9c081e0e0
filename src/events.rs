//! Event catalog models and the create/edit form payload.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_MARKDOWN: &str = "**Describe the event in more detail here!**";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub event_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub current_enrollments: i32,
    #[serde(default)]
    pub description_markdown: Option<String>,
}

impl Event {
    /// True once enrollments reach a known capacity.
    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(cap) => self.current_enrollments >= cap,
            None => false,
        }
    }

    /// "3/20" style occupancy label; empty when capacity is unknown.
    pub fn occupancy(&self) -> String {
        match self.capacity {
            Some(cap) => format!("{}/{}", self.current_enrollments, cap),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Create/edit form state. `validate` must pass before anything is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub description_markdown: String,
    pub event_time: Option<NaiveDateTime>,
    pub capacity: i32,
    pub image: Option<ImageUpload>,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            description_markdown: DEFAULT_MARKDOWN.to_string(),
            event_time: None,
            capacity: 0,
            image: None,
        }
    }
}

impl EventDraft {
    /// Pre-fill an edit form from an existing event.
    pub fn from_event(ev: &Event) -> Self {
        Self {
            title: ev.title.clone(),
            description: ev.description.clone(),
            description_markdown: ev.description_markdown.clone().unwrap_or_else(|| DEFAULT_MARKDOWN.to_string()),
            event_time: ev.event_time,
            capacity: ev.capacity.unwrap_or(0),
            image: None,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().chars().count() < 2 {
            return Err(AppError::user("invalid_title", "title must be at least 2 characters"));
        }
        if self.capacity < 1 {
            return Err(AppError::user("invalid_capacity", "capacity must be at least 1"));
        }
        if self.event_time.is_none() {
            return Err(AppError::user("missing_event_time", "event time is required"));
        }
        Ok(())
    }

    /// Event time as the multipart create endpoint expects it (UTC instant with millis).
    pub(crate) fn event_time_instant(&self) -> Option<String> {
        self.event_time.map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
    }
}

/// Accepts `2025-06-01T18:30`, `2025-06-01T18:30:00` and the same with a space separator.
pub fn parse_event_time(raw: &str) -> AppResult<NaiveDateTime> {
    let s = raw.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    Err(AppError::user("invalid_event_time", format!("cannot parse '{}' as a date and time", s)))
}
