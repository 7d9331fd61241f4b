//! UI-facing controllers holding transient (non-persisted) state.
//!
//! # Responsibility
//! - Form draft lifecycle and validation for event creation.
//! - Calendar granularity selection and its transition flag.

pub mod form;
pub mod view;
