//! Core runtime configuration.
//!
//! # Invariants
//! - `events_key` and `theme_key` are distinct, non-empty storage keys.

use std::time::Duration;

/// Default key of the persisted events entry.
pub const DEFAULT_EVENTS_KEY: &str = "calendar.events";
/// Default key of the persisted theme entry.
pub const DEFAULT_THEME_KEY: &str = "calendar.dark_mode";
/// Delay between a view-change request and its commit.
pub const DEFAULT_VIEW_TRANSITION_DELAY: Duration = Duration::from_millis(150);

/// Settings shared by the stores and controllers of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub events_key: String,
    pub theme_key: String,
    pub view_transition_delay: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            events_key: DEFAULT_EVENTS_KEY.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            view_transition_delay: DEFAULT_VIEW_TRANSITION_DELAY,
        }
    }
}

impl CoreConfig {
    pub fn with_view_transition_delay(mut self, delay: Duration) -> Self {
        self.view_transition_delay = delay;
        self
    }
}
