//! Calendar granularity selection with a delayed, animated commit.
//!
//! # Invariants
//! - The committed view only changes when a pending transition is polled
//!   at or after its due time.
//! - `is_transitioning()` is true exactly while a transition is pending.
//! - A request for a view different from the pending target cancels the
//!   pending transition and restarts the delay.

use std::time::{Duration, Instant};

/// Calendar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
    Agenda,
}

impl CalendarView {
    pub const ALL: [CalendarView; 4] = [
        CalendarView::Month,
        CalendarView::Week,
        CalendarView::Day,
        CalendarView::Agenda,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Agenda => "agenda",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|view| view.key() == normalized.as_str())
    }
}

/// Outcome of [`ViewController::request_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRequest {
    /// Requested view is already the effective target.
    Unchanged,
    /// A transition was started from the stable state.
    Scheduled { due_at: Instant },
    /// A pending transition was replaced and its delay restarted.
    Restarted { due_at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTransition {
    target: CalendarView,
    due_at: Instant,
}

/// Two-state (stable/transitioning) view selector.
#[derive(Debug, Clone)]
pub struct ViewController {
    current: CalendarView,
    pending: Option<PendingTransition>,
    delay: Duration,
}

impl ViewController {
    pub fn new(delay: Duration) -> Self {
        Self::with_view(CalendarView::default(), delay)
    }

    pub fn with_view(current: CalendarView, delay: Duration) -> Self {
        Self {
            current,
            pending: None,
            delay,
        }
    }

    pub fn current(&self) -> CalendarView {
        self.current
    }

    /// View the controller is heading to: the pending target, else current.
    pub fn target(&self) -> CalendarView {
        self.pending.map_or(self.current, |pending| pending.target)
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.due_at)
    }

    /// Requests a view change at time `now`.
    pub fn request_view(&mut self, view: CalendarView, now: Instant) -> ViewRequest {
        if view == self.target() {
            return ViewRequest::Unchanged;
        }

        let due_at = now + self.delay;
        let restarted = self.pending.is_some();
        self.pending = Some(PendingTransition {
            target: view,
            due_at,
        });

        if restarted {
            ViewRequest::Restarted { due_at }
        } else {
            ViewRequest::Scheduled { due_at }
        }
    }

    /// Commits a due transition and returns the committed view.
    pub fn poll(&mut self, now: Instant) -> Option<CalendarView> {
        let pending = self.pending?;
        if now < pending.due_at {
            return None;
        }
        self.pending = None;
        self.current = pending.target;
        Some(pending.target)
    }
}
