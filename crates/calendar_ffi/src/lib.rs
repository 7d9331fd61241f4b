//! Flutter-facing bridge over `calendar_core`.

pub mod api;
