//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical calendar event record and its wire shape.
//! - Define the fixed event type table (label + display color).
//!
//! # Invariants
//! - `id` is unique within one event store and never reused.
//! - `title` is non-empty after trimming for every record created via
//!   `NewEvent::validate()`.
//! - `start`/`end` carry millisecond precision; no ordering between them is
//!   enforced.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier derived from the creation timestamp (epoch millis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    pub fn from_millis(value: i64) -> Self {
        Self(value)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed event category set.
///
/// Serialized as `type` values `reminder|plan|other`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    Reminder,
    Plan,
    Other,
}

impl EventType {
    /// All types in display order.
    pub const ALL: [EventType; 3] = [EventType::Reminder, EventType::Plan, EventType::Other];

    /// Returns the static display descriptor for this type.
    pub fn descriptor(self) -> EventTypeDescriptor {
        match self {
            Self::Reminder => EventTypeDescriptor {
                kind: self,
                key: "reminder",
                label: "Reminder",
                color: "#f59e0b",
            },
            Self::Plan => EventTypeDescriptor {
                kind: self,
                key: "plan",
                label: "Plan",
                color: "#3b82f6",
            },
            Self::Other => EventTypeDescriptor {
                kind: self,
                key: "other",
                label: "Other",
                color: "#6b7280",
            },
        }
    }

    /// Wire key used in persisted data and bridge payloads.
    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    /// Parses a wire key (`reminder|plan|other`).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == normalized.as_str())
    }
}

/// Display metadata for one event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTypeDescriptor {
    pub kind: EventType,
    pub key: &'static str,
    pub label: &'static str,
    /// CSS hex color.
    pub color: &'static str,
}

/// Canonical persisted calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Serialized as `type` to match the persisted entry layout.
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(with = "timestamp_text")]
    pub start: DateTime<Utc>,
    #[serde(with = "timestamp_text")]
    pub end: DateTime<Utc>,
}

/// Input for creating a new event; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub kind: EventType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NewEvent {
    pub fn new(
        title: impl Into<String>,
        kind: EventType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            kind,
            start,
            end,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks record-level invariants before the store accepts the event.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Builds the stored record, normalizing timestamps to millisecond
    /// precision and blank descriptions to `None`.
    pub(crate) fn into_record(self, id: EventId) -> EventRecord {
        let description = self
            .description
            .filter(|value| !value.trim().is_empty());
        EventRecord {
            id,
            title: self.title,
            description,
            kind: self.kind,
            start: self.start.trunc_subsecs(3),
            end: self.end.trunc_subsecs(3),
        }
    }
}

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyTitle,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title cannot be empty"),
        }
    }
}

impl Error for EventValidationError {}

/// Revival rule for `start`/`end`: RFC 3339 text with millisecond precision
/// and a `Z` suffix on write, any RFC 3339 offset accepted on read.
pub mod timestamp_text {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value.trim()).map(|parsed| parsed.with_timezone(&Utc))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|err| {
            serde::de::Error::custom(format!("invalid timestamp `{raw}`: {err}"))
        })
    }
}
