//! Event store: the in-memory source of truth for calendar events.
//!
//! # Responsibility
//! - Own the ordered event sequence and the currently selected event.
//! - Synchronize the full sequence to the persisted events entry on every
//!   mutation.
//!
//! # Invariants
//! - Issued ids are unique and strictly increasing in issue order.
//! - Duplicate ids in loaded data are kept; `remove` deletes all of them.
//! - Loading never fails: absent, unreadable or malformed data yields an
//!   empty store.
//! - A failed write keeps the in-memory mutation; the next successful sync
//!   overwrites the whole entry.
//! - Log events carry ids and counts only, never titles or descriptions.

use crate::clock::{Clock, SystemClock};
use crate::model::event::{EventId, EventRecord, EventValidationError, NewEvent};
use crate::repo::kv_repo::{KeyValueRepository, RepoError};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for store mutations and persistence sync.
#[derive(Debug)]
pub enum StoreError {
    Validation(EventValidationError),
    /// The highest stored id is `i64::MAX`; no larger id can be issued.
    IdExhausted,
    Serialize(serde_json::Error),
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::IdExhausted => write!(f, "no event id left to issue"),
            Self::Serialize(err) => write!(f, "failed to serialize entry: {err}"),
            Self::Repo(err) => write!(f, "failed to persist entry: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::IdExhausted => None,
            Self::Serialize(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<EventValidationError> for StoreError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Ordered event sequence synchronized to one persisted entry.
pub struct EventStore<R: KeyValueRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    key: String,
    events: Vec<EventRecord>,
    selected: Option<EventId>,
    last_issued: Option<i64>,
}

impl<R: KeyValueRepository> EventStore<R> {
    /// Loads the store from `key` using the system clock for new ids.
    pub fn load(repo: R, key: impl Into<String>) -> Self {
        Self::load_with_clock(repo, key, SystemClock)
    }
}

impl<R: KeyValueRepository, C: Clock> EventStore<R, C> {
    /// Loads the persisted entry at `key`.
    ///
    /// Absent entries, backend read errors and parse failures all produce an
    /// empty store; the latter two are logged as diagnostics.
    pub fn load_with_clock(repo: R, key: impl Into<String>, clock: C) -> Self {
        let key = key.into();
        let events = match repo.get_item(&key) {
            Ok(Some(raw)) => match decode_events(&raw) {
                Ok(events) => {
                    info!(
                        "event=events_load module=store status=ok count={}",
                        events.len()
                    );
                    events
                }
                Err(err) => {
                    warn!(
                        "event=events_load module=store status=fallback reason=parse_error error={err}"
                    );
                    Vec::new()
                }
            },
            Ok(None) => {
                info!("event=events_load module=store status=ok count=0 reason=absent");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=events_load module=store status=fallback reason=read_error error={err}"
                );
                Vec::new()
            }
        };
        let duplicates = count_duplicate_ids(&events);
        if duplicates > 0 {
            warn!(
                "event=events_load module=store status=degraded reason=duplicate_ids duplicates={duplicates}"
            );
        }
        let last_issued = events.iter().map(|event| event.id.as_millis()).max();

        Self {
            repo,
            clock,
            key,
            events,
            selected: None,
            last_issued,
        }
    }

    /// Appends a new event with a freshly issued id and syncs storage.
    ///
    /// # Errors
    /// - `Validation` when the title is blank; nothing is stored.
    /// - `IdExhausted` when no larger id can be issued; nothing is stored.
    /// - `Serialize`/`Repo` when the sync fails; the event stays in memory.
    pub fn add(&mut self, event: NewEvent) -> StoreResult<EventId> {
        event.validate()?;

        let id = self.issue_id()?;
        self.events.push(event.into_record(id));
        info!(
            "event=event_add module=store status=ok id={id} count={}",
            self.events.len()
        );

        self.sync()?;
        Ok(id)
    }

    /// Removes every event with `id`.
    ///
    /// Returns `Ok(false)` without touching storage when no event matches.
    /// Clears the selection when it pointed at the removed event.
    pub fn remove(&mut self, id: EventId) -> StoreResult<bool> {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        if self.events.len() == before {
            return Ok(false);
        }

        if self.selected == Some(id) {
            self.selected = None;
        }
        info!(
            "event=event_remove module=store status=ok id={id} count={}",
            self.events.len()
        );

        self.sync()?;
        Ok(true)
    }

    /// Serializes the full sequence in persisted entry form.
    pub fn serialize(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(&self.events)?)
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Marks `id` as the event shown in the details view.
    ///
    /// Returns `false` and leaves the selection unchanged when absent.
    pub fn select(&mut self, id: EventId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn selected(&self) -> Option<&EventRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn issue_id(&mut self) -> StoreResult<EventId> {
        let now_ms = self.clock.now().timestamp_millis();
        let next = match self.last_issued {
            Some(last) if now_ms <= last => {
                last.checked_add(1).ok_or(StoreError::IdExhausted)?
            }
            _ => now_ms,
        };
        self.last_issued = Some(next);
        Ok(EventId::from_millis(next))
    }

    fn sync(&self) -> StoreResult<()> {
        let result = self
            .serialize()
            .and_then(|raw| Ok(self.repo.set_item(&self.key, &raw)?));
        if let Err(err) = &result {
            error!(
                "event=events_sync module=store status=error count={} error={err}",
                self.events.len()
            );
        }
        result
    }
}

fn count_duplicate_ids(events: &[EventRecord]) -> usize {
    let mut seen = HashSet::with_capacity(events.len());
    events.iter().filter(|event| !seen.insert(event.id)).count()
}

/// Decodes a persisted events entry, reviving `start`/`end` timestamps.
pub fn decode_events(raw: &str) -> Result<Vec<EventRecord>, serde_json::Error> {
    serde_json::from_str(raw)
}
