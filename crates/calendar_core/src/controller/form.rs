//! Event creation form state and submission.
//!
//! # Responsibility
//! - Hold the transient draft for a new event.
//! - Validate required fields and hand accepted drafts to the event store.
//!
//! # Invariants
//! - A rejected submission never mutates the store and keeps the form open.
//! - No semantic check is made between `start` and `end`.
//! - Draft timestamps are `datetime-local` text interpreted as UTC.

use crate::clock::Clock;
use crate::model::event::{timestamp_text, EventId, EventType, NewEvent};
use crate::repo::kv_repo::KeyValueRepository;
use crate::service::event_store::{EventStore, StoreError};
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LOCAL_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Draft field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Start,
    End,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// Structured validation failure for a draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValidationError {
    /// Required fields left blank.
    pub missing: Vec<FormField>,
    /// Timestamp fields present but not parseable.
    pub malformed: Vec<FormField>,
}

impl FormValidationError {
    fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.malformed.is_empty()
    }
}

impl Display for FormValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = |fields: &[FormField]| {
            fields
                .iter()
                .map(|field| field.name())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match (self.missing.is_empty(), self.malformed.is_empty()) {
            (false, true) => write!(f, "missing required fields: {}", names(&self.missing)),
            (true, false) => write!(f, "invalid date/time in: {}", names(&self.malformed)),
            _ => write!(
                f,
                "missing required fields: {}; invalid date/time in: {}",
                names(&self.missing),
                names(&self.malformed)
            ),
        }
    }
}

impl Error for FormValidationError {}

/// Error returned by [`FormController::submit`].
#[derive(Debug)]
pub enum FormSubmitError {
    /// Submit was called while the form was closed.
    NotOpen,
    Invalid(FormValidationError),
    Store(StoreError),
}

impl Display for FormSubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "event form is not open"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormSubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotOpen => None,
            Self::Invalid(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<FormValidationError> for FormSubmitError {
    fn from(value: FormValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<StoreError> for FormSubmitError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Editable draft mirroring the event record shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormDraft {
    pub title: String,
    pub description: String,
    pub kind: EventType,
    pub start_text: String,
    pub end_text: String,
}

impl FormDraft {
    /// Draft pre-filled with a calendar-selected range.
    pub fn for_slot(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_text: format_timestamp_text(&start),
            end_text: format_timestamp_text(&end),
            ..Self::default()
        }
    }

    /// Validates required fields and converts the draft into a `NewEvent`.
    pub fn validate(&self) -> Result<NewEvent, FormValidationError> {
        let mut error = FormValidationError::default();

        if self.title.trim().is_empty() {
            error.missing.push(FormField::Title);
        }
        let start = check_timestamp(&self.start_text, FormField::Start, &mut error);
        let end = check_timestamp(&self.end_text, FormField::End, &mut error);

        match (start, end) {
            (Some(start), Some(end)) if error.is_empty() => {
                let mut event = NewEvent::new(self.title.trim(), self.kind, start, end);
                if !self.description.trim().is_empty() {
                    event = event.with_description(self.description.trim());
                }
                Ok(event)
            }
            _ => Err(error),
        }
    }
}

/// Open/closed creation form with its draft.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    draft: FormDraft,
    open: bool,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FormDraft {
        &mut self.draft
    }

    /// Opens the form with an empty draft (type `reminder`).
    pub fn open_for_create(&mut self) {
        self.draft = FormDraft::default();
        self.open = true;
    }

    /// Opens the form with start/end taken from a selected calendar slot.
    pub fn open_for_slot(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.draft = FormDraft::for_slot(start, end);
        self.open = true;
    }

    pub fn validate(&self) -> Result<NewEvent, FormValidationError> {
        self.draft.validate()
    }

    /// Validates the draft and appends it to `store`.
    ///
    /// The form closes once the store has accepted the record, even when the
    /// following persistence sync fails. A record the store refused keeps
    /// the form open with its draft.
    pub fn submit<R, C>(&mut self, store: &mut EventStore<R, C>) -> Result<EventId, FormSubmitError>
    where
        R: KeyValueRepository,
        C: Clock,
    {
        if !self.open {
            return Err(FormSubmitError::NotOpen);
        }
        let event = self.draft.validate()?;

        match store.add(event) {
            Ok(id) => {
                self.close();
                Ok(id)
            }
            Err(err @ (StoreError::Validation(_) | StoreError::IdExhausted)) => Err(err.into()),
            Err(err) => {
                self.close();
                Err(err.into())
            }
        }
    }

    /// Discards the draft and closes the form.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.draft = FormDraft::default();
        self.open = false;
    }
}

/// Parses draft timestamp text.
///
/// Accepts RFC 3339 and `datetime-local` forms (`YYYY-MM-DDTHH:MM` with
/// optional seconds and fraction), the latter read as UTC.
pub fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(parsed) = timestamp_text::parse(trimmed) {
        return Some(parsed);
    }
    LOCAL_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp for a `datetime-local` input.
///
/// Minute-aligned values use `YYYY-MM-DDTHH:MM`; others keep seconds and
/// milliseconds so the text parses back to the same instant.
pub fn format_timestamp_text(value: &DateTime<Utc>) -> String {
    if value.second() == 0 && value.nanosecond() == 0 {
        value.format("%Y-%m-%dT%H:%M").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }
}

fn check_timestamp(
    text: &str,
    field: FormField,
    error: &mut FormValidationError,
) -> Option<DateTime<Utc>> {
    if text.trim().is_empty() {
        error.missing.push(field);
        return None;
    }
    let parsed = parse_timestamp_text(text);
    if parsed.is_none() {
        error.malformed.push(field);
    }
    parsed
}
