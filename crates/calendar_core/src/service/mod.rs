//! Stateful core services.
//!
//! # Responsibility
//! - Own persisted domain state (events, theme) behind repository contracts.
//! - Compose stores and controllers into the session the UI shell drives.

pub mod calendar_session;
pub mod event_store;
pub mod preference_store;
