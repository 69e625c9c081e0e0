//!
//! Enrollment roster
//! -----------------
//! Admin view over the people enrolled in one event: a one-shot fetch gated on the session,
//! free-text filtering across every field, column sorting, and row deletion.
//!
//! The visible rows are always recomputed as `sort(all records) -> filter(sorted, query)`,
//! so the order never depends on the query.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::identity::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub enrollment_time: String,
}

// The timestamp is only ever displayed, searched and compared as text.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// What a delete needs: the row id for the local update, (event, user) for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentRef {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
}

impl From<&EnrollmentRecord> for EnrollmentRef {
    fn from(r: &EnrollmentRecord) -> Self { Self { id: r.id, event_id: r.event_id, user_id: r.user_id } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    EnrollmentTime,
    UserId,
    Email,
    Username,
    EventId,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Id,
        SortField::EnrollmentTime,
        SortField::UserId,
        SortField::Email,
        SortField::Username,
        SortField::EventId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::EnrollmentTime => "enrollmentTime",
            SortField::UserId => "userId",
            SortField::Email => "email",
            SortField::Username => "username",
            SortField::EventId => "eventId",
        }
    }

    /// Case-insensitive; accepts `userId`, `user_id` and `userid`.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s.trim().chars().filter(|c| *c != '_').collect::<String>().to_lowercase();
        SortField::ALL.into_iter().find(|f| f.name().to_lowercase() == key)
    }

    /// String form of the field, as used for both comparison and search.
    pub fn value_of(self, rec: &EnrollmentRecord) -> String {
        match self {
            SortField::Id => rec.id.to_string(),
            SortField::EnrollmentTime => rec.enrollment_time.clone(),
            SortField::UserId => rec.user_id.to_string(),
            SortField::Email => rec.email.clone(),
            SortField::Username => rec.username.clone(),
            SortField::EventId => rec.event_id.to_string(),
        }
    }
}

/// Case-insensitive substring match against any field. An empty query matches everything.
pub fn matches_query(rec: &EnrollmentRecord, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    SortField::ALL.iter().any(|f| f.value_of(rec).to_lowercase().contains(&q))
}

/// Order-preserving filter.
pub fn filter_records<'a>(records: &[&'a EnrollmentRecord], query: &str) -> Vec<&'a EnrollmentRecord> {
    records.iter().copied().filter(|r| matches_query(r, query)).collect()
}

/// Stable lexicographic sort on the field's string form. Ties keep fetch order in both
/// directions, so descending is not the exact reverse of ascending when keys repeat.
pub fn sort_records(records: &[EnrollmentRecord], field: SortField, reversed: bool) -> Vec<&EnrollmentRecord> {
    let mut keyed: Vec<(String, &EnrollmentRecord)> = records.iter().map(|r| (field.value_of(r), r)).collect();
    if reversed {
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
    }
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// `sort(all) -> filter(sorted, query)`. Without a sort field the fetch order is kept.
pub fn visible_rows<'a>(
    records: &'a [EnrollmentRecord],
    sort: Option<(SortField, bool)>,
    query: &str,
) -> Vec<&'a EnrollmentRecord> {
    let ordered: Vec<&EnrollmentRecord> = match sort {
        Some((field, reversed)) => sort_records(records, field, reversed),
        None => records.iter().collect(),
    };
    filter_records(&ordered, query)
}

/// Identifies one roster request; only the most recently issued ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct RosterView {
    event_id: i64,
    records: Vec<EnrollmentRecord>,
    query: String,
    sort: Option<SortField>,
    reversed: bool,
    issued: u64,
    mounted: bool,
}

impl RosterView {
    pub fn new(event_id: i64) -> Self {
        Self { event_id, records: Vec::new(), query: String::new(), sort: None, reversed: false, issued: 0, mounted: false }
    }

    pub fn event_id(&self) -> i64 { self.event_id }
    pub fn records(&self) -> &[EnrollmentRecord] { &self.records }
    pub fn query(&self) -> &str { &self.query }

    pub fn sort_state(&self) -> Option<(SortField, bool)> { self.sort.map(|f| (f, self.reversed)) }

    pub fn rows(&self) -> Vec<&EnrollmentRecord> { visible_rows(&self.records, self.sort_state(), &self.query) }

    /// Nothing to show, either because nothing was fetched or the query matched nothing.
    pub fn is_empty_view(&self) -> bool { self.rows().is_empty() }

    /// First display of the view. Fetches once, and only for a confirmed administrator;
    /// later calls are no-ops. Returns whether a request was issued.
    pub async fn mount(&mut self, api: &ApiClient, session: &Session) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;
        if !(session.is_authenticated() && session.is_admin()) {
            debug!(target: "eventdesk::roster", "event={} not fetching roster for non-admin session", self.event_id);
            return false;
        }
        self.refresh(api).await;
        true
    }

    /// Fetch the roster now. Failures are logged and leave the records as they were.
    pub async fn refresh(&mut self, api: &ApiClient) -> bool {
        let ticket = self.begin_fetch();
        let result = api.enrollments_for_event(self.event_id).await;
        self.apply_fetch(ticket, result)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket { seq: self.issued }
    }

    /// Apply a fetch result if `ticket` is still the latest one issued. Returns whether the
    /// working set was replaced.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: AppResult<Vec<EnrollmentRecord>>) -> bool {
        if ticket.seq != self.issued {
            debug!(
                target: "eventdesk::roster",
                "event={} discarding stale roster response seq={} latest={}",
                self.event_id, ticket.seq, self.issued
            );
            return false;
        }
        match result {
            Ok(records) => {
                self.records = dedupe_by_id(self.event_id, records);
                info!(target: "eventdesk::roster", "event={} loaded {} enrollments", self.event_id, self.records.len());
                true
            }
            Err(e @ AppError::NotFound { .. }) => {
                warn!(target: "eventdesk::roster", "event={} roster not found: {}", self.event_id, e);
                false
            }
            Err(e) => {
                error!(target: "eventdesk::roster", "event={} failed to fetch enrollments: {}", self.event_id, e);
                false
            }
        }
    }

    /// Clicking a column header: same field flips direction, another field sorts ascending.
    pub fn set_sorting(&mut self, field: SortField) {
        self.reversed = if self.sort == Some(field) { !self.reversed } else { false };
        self.sort = Some(field);
    }

    pub fn set_search(&mut self, query: &str) { self.query = query.to_string(); }

    /// Delete on the server, then drop the row locally by id. Nothing changes locally unless
    /// the server confirmed. Returns whether a local row was removed.
    pub async fn delete_record(&mut self, api: &ApiClient, target: EnrollmentRef) -> AppResult<bool> {
        match api.remove_enrollment(&target).await {
            Ok(()) => {
                let removed = self.remove_local(target.id);
                info!(
                    target: "eventdesk::roster",
                    "event={} removed enrollment id={} user={} local_removed={}",
                    target.event_id, target.id, target.user_id, removed
                );
                Ok(removed)
            }
            Err(e) => {
                error!(target: "eventdesk::roster", "deleting enrollment id={} failed: {}", target.id, e);
                Err(e)
            }
        }
    }

    fn remove_local(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }
}

fn dedupe_by_id(event_id: i64, records: Vec<EnrollmentRecord>) -> Vec<EnrollmentRecord> {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let out: Vec<EnrollmentRecord> = records.into_iter().filter(|r| seen.insert(r.id)).collect();
    if out.len() != total {
        warn!(target: "eventdesk::roster", "event={} dropped {} duplicate enrollment ids", event_id, total - out.len());
    }
    out
}
