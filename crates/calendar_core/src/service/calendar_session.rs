//! Calendar session facade.
//!
//! # Responsibility
//! - Own one event store, preference store, filter/search state, view
//!   controller and form controller over a shared repository.
//! - Notify subscribers after every state change so the shell can re-read
//!   `visible_events()` and re-render.
//!
//! # Invariants
//! - Controllers never mutate events directly; all event writes go through
//!   the event store.
//! - Subscribers are notified after the change is applied, in subscription
//!   order.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::controller::form::{FormController, FormDraft, FormSubmitError};
use crate::controller::view::{CalendarView, ViewController, ViewRequest};
use crate::model::event::{EventId, EventRecord, EventType};
use crate::repo::kv_repo::KeyValueRepository;
use crate::search::projection::{project, type_counts, FilterState};
use crate::service::event_store::{EventStore, StoreResult};
use crate::service::preference_store::{PreferenceStore, ThemeMode};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Instant;

/// State change delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    EventsChanged,
    SelectionChanged(Option<EventId>),
    FiltersChanged,
    SearchChanged,
    FormOpened,
    FormClosed,
    ViewTransitionStarted(CalendarView),
    ViewCommitted(CalendarView),
    ThemeChanged(ThemeMode),
}

/// Handle returned by [`CalendarSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SessionChange) + Send>;

/// Single-user calendar state composed from the core components.
pub struct CalendarSession<R, C = SystemClock>
where
    R: KeyValueRepository + Clone,
    C: Clock,
{
    events: EventStore<R, C>,
    preferences: PreferenceStore<R>,
    filters: FilterState,
    query: String,
    view: ViewController,
    form: FormController,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<R> CalendarSession<R>
where
    R: KeyValueRepository + Clone,
{
    /// Loads persisted state from `repo` using the system clock.
    pub fn open(repo: R, config: &CoreConfig) -> Self {
        Self::open_with_clock(repo, config, SystemClock)
    }
}

impl<R, C> CalendarSession<R, C>
where
    R: KeyValueRepository + Clone,
    C: Clock,
{
    pub fn open_with_clock(repo: R, config: &CoreConfig, clock: C) -> Self {
        Self {
            events: EventStore::load_with_clock(repo.clone(), config.events_key.as_str(), clock),
            preferences: PreferenceStore::load(repo, config.theme_key.as_str()),
            filters: FilterState::default(),
            query: String::new(),
            view: ViewController::new(config.view_transition_delay),
            form: FormController::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SessionChange) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn events(&self) -> &EventStore<R, C> {
        &self.events
    }

    /// Recomputes the projection rendered on the calendar.
    pub fn visible_events(&self) -> Vec<&EventRecord> {
        project(self.events.events(), &self.filters, &self.query)
    }

    pub fn type_counts(&self) -> BTreeMap<EventType, usize> {
        type_counts(self.events.events())
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn theme(&self) -> ThemeMode {
        self.preferences.theme()
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.query {
            return;
        }
        self.query = query;
        self.notify(SessionChange::SearchChanged);
    }

    pub fn set_filter(&mut self, kind: EventType, visible: bool) {
        if self.filters.is_visible(kind) == visible {
            return;
        }
        self.filters.set(kind, visible);
        self.notify(SessionChange::FiltersChanged);
    }

    /// Flips one type filter and returns its new visibility.
    pub fn toggle_filter(&mut self, kind: EventType) -> bool {
        let visible = self.filters.toggle(kind);
        self.notify(SessionChange::FiltersChanged);
        visible
    }

    pub fn open_create_form(&mut self) {
        self.form.open_for_create();
        self.notify(SessionChange::FormOpened);
    }

    pub fn open_form_for_slot(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.form.open_for_slot(start, end);
        self.notify(SessionChange::FormOpened);
    }

    /// Mutable access to the open draft; edits are not broadcast.
    pub fn draft_mut(&mut self) -> &mut FormDraft {
        self.form.draft_mut()
    }

    /// Submits the form draft to the event store.
    pub fn submit_form(&mut self) -> Result<EventId, FormSubmitError> {
        let was_open = self.form.is_open();
        let count_before = self.events.len();
        let result = self.form.submit(&mut self.events);

        if self.events.len() != count_before {
            self.notify(SessionChange::EventsChanged);
        }
        if was_open && !self.form.is_open() {
            self.notify(SessionChange::FormClosed);
        }
        result
    }

    pub fn cancel_form(&mut self) {
        if !self.form.is_open() {
            return;
        }
        self.form.cancel();
        self.notify(SessionChange::FormClosed);
    }

    /// Opens the details view for `id`; returns `false` when absent.
    pub fn select_event(&mut self, id: EventId) -> bool {
        let selected = self.events.select(id);
        if selected {
            self.notify(SessionChange::SelectionChanged(Some(id)));
        }
        selected
    }

    pub fn clear_selection(&mut self) {
        if self.events.selected().is_none() {
            return;
        }
        self.events.clear_selection();
        self.notify(SessionChange::SelectionChanged(None));
    }

    pub fn selected_event(&self) -> Option<&EventRecord> {
        self.events.selected()
    }

    /// Deletes `id`; returns `Ok(false)` when no event matched.
    pub fn delete_event(&mut self, id: EventId) -> StoreResult<bool> {
        let was_selected = self.events.selected().map(|event| event.id) == Some(id);
        let count_before = self.events.len();
        let result = self.events.remove(id);

        if self.events.len() != count_before {
            self.notify(SessionChange::EventsChanged);
            if was_selected {
                self.notify(SessionChange::SelectionChanged(None));
            }
        }
        result
    }

    /// Deletes the event shown in the details view, if any.
    pub fn delete_selected(&mut self) -> StoreResult<Option<EventId>> {
        let Some(id) = self.events.selected().map(|event| event.id) else {
            return Ok(None);
        };
        self.delete_event(id)?;
        Ok(Some(id))
    }

    pub fn request_view(&mut self, view: CalendarView, now: Instant) -> ViewRequest {
        let request = self.view.request_view(view, now);
        if request != ViewRequest::Unchanged {
            self.notify(SessionChange::ViewTransitionStarted(view));
        }
        request
    }

    /// Drives the view transition timer; call from the shell's timer loop.
    pub fn poll_view(&mut self, now: Instant) -> Option<CalendarView> {
        let committed = self.view.poll(now)?;
        self.notify(SessionChange::ViewCommitted(committed));
        Some(committed)
    }

    pub fn toggle_theme(&mut self) -> StoreResult<ThemeMode> {
        let result = self.preferences.toggle();
        let theme = self.preferences.theme();
        self.notify(SessionChange::ThemeChanged(theme));
        result
    }

    fn notify(&mut self, change: SessionChange) {
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }
}
