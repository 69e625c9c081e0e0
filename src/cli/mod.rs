pub mod outputformatter;
pub mod shell;

use crate::api::enrollments::MyEnrollment;
use crate::events::Event;
use crate::roster::{EnrollmentRecord, SortField};
use outputformatter::Table;

fn fmt_time(ev: &Event) -> String {
    ev.event_time.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default()
}

pub fn events_table(events: &[Event]) -> Table {
    let mut t = Table::new(["id", "title", "when", "seats", "status"]);
    for ev in events {
        let status = if ev.is_full() { "full" } else { "open" };
        t.push_row(vec![ev.id.to_string(), ev.title.clone(), fmt_time(ev), ev.occupancy(), status.to_string()]);
    }
    t
}

/// Roster columns with a sort marker on the active header.
pub fn roster_table(rows: &[&EnrollmentRecord], sort: Option<(SortField, bool)>) -> Table {
    let header = |field: SortField| -> String {
        match sort {
            Some((f, reversed)) if f == field => format!("{} {}", field.name(), if reversed { "^" } else { "v" }),
            _ => field.name().to_string(),
        }
    };
    let mut t = Table::new([
        header(SortField::Id),
        header(SortField::Username),
        header(SortField::Email),
        header(SortField::UserId),
        header(SortField::EnrollmentTime),
    ]);
    for r in rows {
        t.push_row(vec![r.id.to_string(), r.username.clone(), r.email.clone(), r.user_id.to_string(), r.enrollment_time.clone()]);
    }
    t
}

pub fn my_enrollments_table(items: &[MyEnrollment]) -> Table {
    let mut t = Table::new(["enrollment", "event", "title", "when", "enrolled at"]);
    for e in items {
        let (event_id, title, when) = match &e.event {
            Some(ev) => (ev.id.to_string(), ev.title.clone(), fmt_time(ev)),
            None => (String::new(), String::new(), String::new()),
        };
        t.push_row(vec![e.id.to_string(), event_id, title, when, e.enrollment_time.clone().unwrap_or_default()]);
    }
    t
}
