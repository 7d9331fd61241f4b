//! FFI use-case API for the Flutter calendar shell.
//!
//! # Responsibility
//! - Expose the calendar session to Dart via FRB as sync, use-case calls.
//! - Flatten core types into plain envelopes the shell can render.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide session backs every call; it is created lazily from
//!   the entry database on first use.
//! - Timestamps cross the boundary as UTC epoch milliseconds.

use calendar_core::db::open_db;
use calendar_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CalendarSession, CalendarView, CoreConfig, EventId, EventRecord, EventType,
    FormSubmitError, SqliteKeyValueRepository, ViewRequest,
};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

const ENTRY_DB_FILE_NAME: &str = "calendar_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: Mutex<Option<BridgeSession>> = Mutex::new(None);

type BridgeSession = CalendarSession<SqliteKeyValueRepository>;

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One event as rendered by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Type key (`reminder|plan|other`).
    pub kind: String,
    pub label: String,
    pub color: String,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
}

/// Type filter checkbox state with its legend count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFilterItem {
    pub kind: String,
    pub label: String,
    pub color: String,
    pub visible: bool,
    pub count: u32,
}

/// Everything the shell needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSnapshot {
    pub ok: bool,
    /// Projection of events after filters and search.
    pub events: Vec<CalendarEventItem>,
    pub filters: Vec<CalendarFilterItem>,
    pub query: String,
    pub view: String,
    pub transitioning: bool,
    /// `light` or `dark`.
    pub theme: String,
    pub form_open: bool,
    pub selected: Option<CalendarEventItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarActionResponse {
    pub ok: bool,
    pub event_id: Option<i64>,
    /// Required form fields left blank (`title|start|end`).
    pub missing_fields: Vec<String>,
    /// Form timestamp fields that could not be parsed.
    pub invalid_fields: Vec<String>,
    pub message: String,
}

impl CalendarActionResponse {
    fn success(message: impl Into<String>, event_id: Option<i64>) -> Self {
        Self {
            ok: true,
            event_id,
            missing_fields: Vec::new(),
            invalid_fields: Vec::new(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            event_id: None,
            missing_fields: Vec::new(),
            invalid_fields: Vec::new(),
            message: message.into(),
        }
    }
}

/// Returns the current render snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_snapshot() -> CalendarSnapshot {
    match with_session(|session| build_snapshot(session)) {
        Ok(snapshot) => snapshot,
        Err(err) => CalendarSnapshot {
            ok: false,
            events: Vec::new(),
            filters: Vec::new(),
            query: String::new(),
            view: CalendarView::default().key().to_string(),
            transitioning: false,
            theme: "light".to_string(),
            form_open: false,
            selected: None,
            message: format!("calendar_snapshot failed: {err}"),
        },
    }
}

/// Replaces the search box text.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_set_search(text: String) -> CalendarActionResponse {
    run_action("calendar_set_search", |session| {
        session.set_search(text);
        CalendarActionResponse::success("Search updated.", None)
    })
}

/// Flips one type filter checkbox.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_toggle_filter(kind: String) -> CalendarActionResponse {
    let Some(kind) = EventType::parse(&kind) else {
        return CalendarActionResponse::failure(format!("unknown event type `{kind}`"));
    };
    run_action("calendar_toggle_filter", |session| {
        let visible = session.toggle_filter(kind);
        let state = if visible { "shown" } else { "hidden" };
        CalendarActionResponse::success(format!("{} {state}.", kind.descriptor().label), None)
    })
}

/// Opens the creation form with an empty draft.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_open_create_form() -> CalendarActionResponse {
    run_action("calendar_open_create_form", |session| {
        session.open_create_form();
        CalendarActionResponse::success("Form opened.", None)
    })
}

/// Opens the creation form pre-filled with a selected calendar slot.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_open_form_for_slot(
    start_epoch_ms: i64,
    end_epoch_ms: i64,
) -> CalendarActionResponse {
    let (Some(start), Some(end)) = (
        epoch_ms_to_utc(start_epoch_ms),
        epoch_ms_to_utc(end_epoch_ms),
    ) else {
        return CalendarActionResponse::failure("slot timestamps are out of range");
    };
    run_action("calendar_open_form_for_slot", |session| {
        session.open_form_for_slot(start, end);
        CalendarActionResponse::success("Form opened.", None)
    })
}

/// Replaces the open draft with shell input.
///
/// `start_text`/`end_text` use `datetime-local` form (`YYYY-MM-DDTHH:MM`).
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_update_draft(
    title: String,
    description: String,
    kind: String,
    start_text: String,
    end_text: String,
) -> CalendarActionResponse {
    let Some(kind) = EventType::parse(&kind) else {
        return CalendarActionResponse::failure(format!("unknown event type `{kind}`"));
    };
    run_action("calendar_update_draft", |session| {
        if !session.form().is_open() {
            return CalendarActionResponse::failure("event form is not open");
        }
        let draft = session.draft_mut();
        draft.title = title;
        draft.description = description;
        draft.kind = kind;
        draft.start_text = start_text;
        draft.end_text = end_text;
        CalendarActionResponse::success("Draft updated.", None)
    })
}

/// Submits the open draft.
///
/// On validation failure the form stays open and the response lists the
/// offending fields.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_submit_form() -> CalendarActionResponse {
    run_action("calendar_submit_form", |session| match session.submit_form() {
        Ok(id) => CalendarActionResponse::success("Event created.", Some(id.as_millis())),
        Err(FormSubmitError::Invalid(err)) => CalendarActionResponse {
            ok: false,
            event_id: None,
            missing_fields: err.missing.iter().map(|f| f.name().to_string()).collect(),
            invalid_fields: err.malformed.iter().map(|f| f.name().to_string()).collect(),
            message: err.to_string(),
        },
        Err(err) => {
            CalendarActionResponse::failure(format!("calendar_submit_form failed: {err}"))
        }
    })
}

/// Discards the draft and closes the form.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_cancel_form() -> CalendarActionResponse {
    run_action("calendar_cancel_form", |session| {
        session.cancel_form();
        CalendarActionResponse::success("Form closed.", None)
    })
}

/// Opens the details view for one event.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_select_event(event_id: i64) -> CalendarActionResponse {
    run_action("calendar_select_event", |session| {
        if session.select_event(EventId::from_millis(event_id)) {
            CalendarActionResponse::success("Event selected.", Some(event_id))
        } else {
            CalendarActionResponse::failure(format!("event not found: {event_id}"))
        }
    })
}

/// Deletes one event by id; deleting an unknown id is a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_delete_event(event_id: i64) -> CalendarActionResponse {
    run_action("calendar_delete_event", |session| {
        match session.delete_event(EventId::from_millis(event_id)) {
            Ok(true) => CalendarActionResponse::success("Event deleted.", Some(event_id)),
            Ok(false) => CalendarActionResponse::success("Event already absent.", None),
            Err(err) => {
                CalendarActionResponse::failure(format!("calendar_delete_event failed: {err}"))
            }
        }
    })
}

/// Requests a view change (`month|week|day|agenda`).
///
/// The shell must keep calling [`calendar_poll_view`] until the transition
/// commits.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_request_view(view: String) -> CalendarActionResponse {
    let Some(view) = CalendarView::parse(&view) else {
        return CalendarActionResponse::failure(format!("unknown view `{view}`"));
    };
    run_action("calendar_request_view", |session| {
        let request = session.request_view(view, Instant::now());
        CalendarActionResponse::success(view_request_message(view, request), None)
    })
}

/// Commits a due view transition; returns the current view key.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_poll_view() -> String {
    with_session(|session| {
        session.poll_view(Instant::now());
        session.view().current().key().to_string()
    })
    .unwrap_or_else(|_| CalendarView::default().key().to_string())
}

/// Flips the theme and returns the new attribute value (`light|dark`).
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_toggle_theme() -> CalendarActionResponse {
    run_action("calendar_toggle_theme", |session| match session.toggle_theme() {
        Ok(theme) => CalendarActionResponse::success(theme.attribute(), None),
        Err(err) => {
            CalendarActionResponse::failure(format!("calendar_toggle_theme failed: {err}"))
        }
    })
}

fn run_action(
    operation: &str,
    f: impl FnOnce(&mut BridgeSession) -> CalendarActionResponse,
) -> CalendarActionResponse {
    with_session(f)
        .unwrap_or_else(|err| CalendarActionResponse::failure(format!("{operation} failed: {err}")))
}

fn with_session<T>(f: impl FnOnce(&mut BridgeSession) -> T) -> Result<T, String> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| "calendar session lock poisoned".to_string())?;
    if guard.is_none() {
        let db_path = resolve_entry_db_path();
        let conn = open_db(&db_path).map_err(|err| {
            error!("event=session_open module=ffi status=error error={err}");
            format!("entry DB open failed: {err}")
        })?;
        let repo = SqliteKeyValueRepository::new(conn);
        *guard = Some(CalendarSession::open(repo, &CoreConfig::default()));
        info!("event=session_open module=ffi status=ok");
    }
    match guard.as_mut() {
        Some(session) => Ok(f(session)),
        None => Err("calendar session unavailable".to_string()),
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("CALENDAR_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn build_snapshot(session: &BridgeSession) -> CalendarSnapshot {
    let counts = session.type_counts();
    let filters = EventType::ALL
        .into_iter()
        .map(|kind| {
            let descriptor = kind.descriptor();
            CalendarFilterItem {
                kind: descriptor.key.to_string(),
                label: descriptor.label.to_string(),
                color: descriptor.color.to_string(),
                visible: session.filters().is_visible(kind),
                count: counts
                    .get(&kind)
                    .map_or(0, |count| u32::try_from(*count).unwrap_or(u32::MAX)),
            }
        })
        .collect();
    let events = session
        .visible_events()
        .into_iter()
        .map(to_event_item)
        .collect::<Vec<_>>();
    let message = if events.is_empty() {
        "No events.".to_string()
    } else {
        format!("Showing {} event(s).", events.len())
    };

    CalendarSnapshot {
        ok: true,
        events,
        filters,
        query: session.query().to_string(),
        view: session.view().current().key().to_string(),
        transitioning: session.view().is_transitioning(),
        theme: session.theme().attribute().to_string(),
        form_open: session.form().is_open(),
        selected: session.selected_event().map(to_event_item),
        message,
    }
}

fn to_event_item(event: &EventRecord) -> CalendarEventItem {
    let descriptor = event.kind.descriptor();
    CalendarEventItem {
        id: event.id.as_millis(),
        title: event.title.clone(),
        description: event.description.clone(),
        kind: descriptor.key.to_string(),
        label: descriptor.label.to_string(),
        color: descriptor.color.to_string(),
        start_epoch_ms: event.start.timestamp_millis(),
        end_epoch_ms: event.end.timestamp_millis(),
    }
}

fn view_request_message(view: CalendarView, request: ViewRequest) -> String {
    match request {
        ViewRequest::Unchanged => format!("Already showing {}.", view.key()),
        ViewRequest::Scheduled { .. } => format!("Switching to {}.", view.key()),
        ViewRequest::Restarted { .. } => format!("Switching to {} instead.", view.key()),
    }
}

fn epoch_ms_to_utc(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms)
}
