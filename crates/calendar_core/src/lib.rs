//! Core domain logic for the calendar.
//! This crate is the single source of truth for event data and UI state
//! invariants; UI shells only render what it exposes.

pub mod clock;
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use controller::form::{
    format_timestamp_text, parse_timestamp_text, FormController, FormDraft, FormField,
    FormSubmitError, FormValidationError,
};
pub use controller::view::{CalendarView, ViewController, ViewRequest};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{
    EventId, EventRecord, EventType, EventTypeDescriptor, EventValidationError, NewEvent,
};
pub use repo::kv_repo::{
    KeyValueRepository, MemoryKeyValueRepository, RepoError, RepoResult,
    SqliteKeyValueRepository,
};
pub use search::projection::{project, type_counts, FilterState};
pub use service::calendar_session::{CalendarSession, SessionChange, SubscriptionId};
pub use service::event_store::{decode_events, EventStore, StoreError, StoreResult};
pub use service::preference_store::{PreferenceStore, ThemeMode};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
