//! Visible-event projection.
//!
//! # Responsibility
//! - Derive the rendered subset of events from type filters and the search
//!   box, recomputed after every state change.

pub mod projection;
