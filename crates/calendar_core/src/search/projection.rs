//! Filter/search projection over the event sequence.
//!
//! # Invariants
//! - Projection is pure: it borrows records and never mutates them.
//! - Output keeps the relative order of the input and never repeats a
//!   record.
//! - A record whose type is hidden is never returned.

use crate::model::event::{EventRecord, EventType};
use std::collections::BTreeMap;

/// Per-type visibility flags; every type starts visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    visible: BTreeMap<EventType, bool>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            visible: EventType::ALL.into_iter().map(|kind| (kind, true)).collect(),
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, kind: EventType) -> bool {
        self.visible.get(&kind).copied().unwrap_or(true)
    }

    pub fn set(&mut self, kind: EventType, visible: bool) {
        self.visible.insert(kind, visible);
    }

    /// Flips one flag and returns its new value.
    pub fn toggle(&mut self, kind: EventType) -> bool {
        let next = !self.is_visible(kind);
        self.set(kind, next);
        next
    }

    pub fn all_visible(&self) -> bool {
        EventType::ALL.into_iter().all(|kind| self.is_visible(kind))
    }
}

/// Returns the events shown on the calendar, in store order.
///
/// A record is kept when its type is visible and either `query` is blank or
/// the record title contains `query` case-insensitively.
pub fn project<'a>(
    events: &'a [EventRecord],
    filters: &FilterState,
    query: &str,
) -> Vec<&'a EventRecord> {
    let needle = normalize_query(query);
    events
        .iter()
        .filter(|event| filters.is_visible(event.kind))
        .filter(|event| match &needle {
            Some(needle) => event.title.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}

/// Counts events per type, including types with no events.
pub fn type_counts(events: &[EventRecord]) -> BTreeMap<EventType, usize> {
    let mut counts: BTreeMap<EventType, usize> =
        EventType::ALL.into_iter().map(|kind| (kind, 0)).collect();
    for event in events {
        *counts.entry(event.kind).or_insert(0) += 1;
    }
    counts
}

fn normalize_query(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        return None;
    }
    Some(query.to_lowercase())
}
