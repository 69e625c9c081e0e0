//!
//! eventdesk interactive shell
//! ---------------------------
//! Line-oriented stand-in for the browser pages: every command maps onto a page action
//! (navigate, log in, enroll, sort the roster...) and drives the same library calls.

use tracing::warn;

use super::{events_table, my_enrollments_table, roster_table};
use crate::api::auth::Registration;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::events::{parse_event_time, Event, EventDraft};
use crate::roster::{EnrollmentRef, RosterView, SortField};
use crate::router::{Navigation, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub const HELP: &str = "\
Commands:
  open <path>                       navigate to a page (/, /events/<id>, /create, /edit/<id>, /my-enrollments)
  login <user> <password>           sign in
  logout                            sign out
  whoami                            show the current session
  register <user> <email> <password> <confirm>
  events                            list events
  event <id>                        show one event
  enroll <id> | unenroll <id>       join or leave an event
  mine                              list your enrollments
  roster <eventId>                  open the enrollment roster of an event (admin)
  search <text>                     filter the open roster (empty clears)
  sort <field>                      sort the roster; repeat to flip direction
                                    fields: id, username, email, userId, eventId, enrollmentTime
  kick <enrollmentId>               delete an enrollment from the open roster
  create <title> | <capacity> | <yyyy-mm-ddThh:mm> | <description>
  edit <id> | <title> | <capacity> | <yyyy-mm-ddThh:mm> | <description>
  delete-event <id>
  help | quit";

pub struct Shell {
    ctx: AppContext,
    roster: Option<RosterView>,
}

impl Shell {
    pub fn new(ctx: AppContext) -> Self { Self { ctx, roster: None } }

    pub fn context(&self) -> &AppContext { &self.ctx }
    pub fn roster(&self) -> Option<&RosterView> { self.roster.as_ref() }

    pub async fn execute(&mut self, line: &str) -> AppResult<Flow> {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        match cmd.to_lowercase().as_str() {
            "" => {}
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => println!("{}", HELP),
            "open" => self.open(if rest.is_empty() { "/" } else { rest }).await?,
            "login" => {
                let [user, pass] = args.as_slice() else { return Err(usage("login <user> <password>")); };
                self.ctx.session().login(user, pass).await?;
                self.whoami();
            }
            "logout" => {
                self.ctx.session().logout().await;
                self.roster = None;
                println!("signed out");
            }
            "whoami" => self.whoami(),
            "register" => {
                let [user, email, pass, confirm] = args.as_slice() else {
                    return Err(usage("register <user> <email> <password> <confirm>"));
                };
                let reg = Registration::new(user, email, pass, confirm)?;
                self.ctx.session().register(&reg).await?;
                println!("account '{}' created; use 'login' to sign in", reg.username);
            }
            "events" => events_table(&self.ctx.api().list_events().await?).print(),
            "event" => self.show_event(parse_id(&args, "event <id>")?).await?,
            "enroll" => {
                let id = parse_id(&args, "enroll <id>")?;
                self.ctx.api().enroll(id).await?;
                println!("enrolled in event {}", id);
            }
            "unenroll" => {
                let id = parse_id(&args, "unenroll <id>")?;
                self.ctx.api().unenroll(id).await?;
                println!("left event {}", id);
            }
            "mine" => my_enrollments_table(&self.ctx.api().my_enrollments().await?).print(),
            "roster" => {
                let id = parse_id(&args, "roster <eventId>")?;
                self.open_roster(id).await;
                self.print_roster();
            }
            "search" => {
                self.roster_mut()?.set_search(rest);
                self.print_roster();
            }
            "sort" => {
                let field = args
                    .first()
                    .and_then(|f| SortField::parse(f))
                    .ok_or_else(|| usage("sort <id|username|email|userId|eventId|enrollmentTime>"))?;
                self.roster_mut()?.set_sorting(field);
                self.print_roster();
            }
            "kick" => {
                let id = parse_id(&args, "kick <enrollmentId>")?;
                let api = self.ctx.api().clone();
                let roster = self.roster_mut()?;
                let target = roster
                    .records()
                    .iter()
                    .find(|r| r.id == id)
                    .map(EnrollmentRef::from)
                    .ok_or_else(|| AppError::user("unknown_enrollment", format!("no enrollment {} in the open roster", id)))?;
                roster.delete_record(&api, target).await?;
                self.print_roster();
            }
            "create" => {
                let draft = parse_draft(rest.split('|').map(str::trim).collect::<Vec<_>>().as_slice())?;
                let ev = self.ctx.api().create_event(&draft).await?;
                println!("created event {} '{}'", ev.id, ev.title);
            }
            "edit" => {
                let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
                let Some((id, fields)) = parts.split_first() else { return Err(usage("edit <id> | ...")); };
                let id: i64 = id.parse().map_err(|_| usage("edit <id> | <title> | <capacity> | <time> | <description>"))?;
                let current = self.ctx.api().get_event(id).await?;
                let mut draft = EventDraft::from_event(&current);
                let edited = parse_draft(fields)?;
                draft.title = edited.title;
                draft.capacity = edited.capacity;
                draft.event_time = edited.event_time;
                draft.description = edited.description;
                let ev = self.ctx.api().update_event(id, &draft).await?;
                println!("updated event {} '{}'", ev.id, ev.title);
            }
            "delete-event" => {
                let id = parse_id(&args, "delete-event <id>")?;
                self.ctx.api().delete_event(id).await?;
                println!("deleted event {}", id);
            }
            other => return Err(AppError::user("unknown_command", format!("unknown command '{}'; try 'help'", other))),
        }
        Ok(Flow::Continue)
    }

    /// Guarded navigation followed by rendering whatever page we end up on.
    pub async fn open(&mut self, path: &str) -> AppResult<()> {
        let route = match self.ctx.navigate(path) {
            Navigation::Loading => {
                println!("Loading...");
                return Ok(());
            }
            Navigation::Redirect(to) => {
                println!("redirected to {}", to);
                to
            }
            Navigation::Show(route) => route,
        };
        self.render(&route).await
    }

    async fn render(&mut self, route: &Route) -> AppResult<()> {
        match route {
            Route::Home => events_table(&self.ctx.api().list_events().await?).print(),
            Route::Login => println!("sign in with: login <user> <password>"),
            Route::Register => println!("create an account with: register <user> <email> <password> <confirm>"),
            Route::Event(id) => self.show_event(*id).await?,
            Route::CreateEvent => println!("create an event with: create <title> | <capacity> | <time> | <description>"),
            Route::EditEvent(id) => {
                self.show_event(*id).await?;
                self.open_roster(*id).await;
                self.print_roster();
            }
            Route::MyEnrollments => my_enrollments_table(&self.ctx.api().my_enrollments().await?).print(),
            Route::NotFound(p) => println!("no page at {}", p),
        }
        Ok(())
    }

    async fn show_event(&self, id: i64) -> AppResult<()> {
        let ev: Event = self.ctx.api().get_event(id).await?;
        println!("#{} {}", ev.id, ev.title);
        if let Some(t) = ev.event_time {
            println!("when:  {}", t.format("%Y-%m-%d %H:%M"));
        }
        if ev.capacity.is_some() {
            println!("seats: {}{}", ev.occupancy(), if ev.is_full() { " (full)" } else { "" });
        }
        if !ev.description.is_empty() {
            println!("\n{}", ev.description);
        }
        if let Some(md) = ev.description_markdown.as_deref().filter(|m| !m.is_empty()) {
            println!("\n{}", md);
        }
        Ok(())
    }

    async fn open_roster(&mut self, event_id: i64) {
        let mut view = RosterView::new(event_id);
        let session = self.ctx.snapshot();
        if !view.mount(self.ctx.api(), &session).await {
            warn!(target: "eventdesk", "roster for event {} not loaded (admin session required)", event_id);
        }
        self.roster = Some(view);
    }

    fn print_roster(&self) {
        let Some(view) = &self.roster else { return; };
        let rows = view.rows();
        if rows.is_empty() {
            println!("Nothing found");
            return;
        }
        roster_table(&rows, view.sort_state()).print();
    }

    fn roster_mut(&mut self) -> AppResult<&mut RosterView> {
        self.roster.as_mut().ok_or_else(|| AppError::user("no_roster", "no roster open; use 'roster <eventId>' first"))
    }

    fn whoami(&self) {
        let s = self.ctx.snapshot();
        if s.is_loading() {
            println!("session: loading");
        } else if s.is_authenticated() {
            println!("signed in as {}{}", s.username().unwrap_or("?"), if s.is_admin() { " (admin)" } else { "" });
        } else {
            println!("not signed in");
        }
    }
}

fn usage(text: &str) -> AppError { AppError::user("usage", format!("usage: {}", text)) }

fn parse_id(args: &[&str], text: &str) -> AppResult<i64> {
    args.first().and_then(|a| a.parse().ok()).ok_or_else(|| usage(text))
}

fn parse_draft(fields: &[&str]) -> AppResult<EventDraft> {
    let [title, capacity, when, description @ ..] = fields else {
        return Err(usage("<title> | <capacity> | <yyyy-mm-ddThh:mm> | <description>"));
    };
    let capacity: i32 = capacity
        .parse()
        .map_err(|_| AppError::user("invalid_capacity", format!("'{}' is not a number", capacity)))?;
    let draft = EventDraft {
        title: title.to_string(),
        capacity,
        event_time: Some(parse_event_time(when)?),
        description: description.join(" | "),
        ..Default::default()
    };
    draft.validate()?;
    Ok(draft)
}
