//! Calendar domain model.
//!
//! # Responsibility
//! - Define the event record shared by the store, projection and bridge.
//! - Keep the persisted wire shape in one place.
//!
//! # Invariants
//! - Every event is identified by a store-unique `EventId`.
//! - Deletion is a hard removal by id; records are never edited in place.

pub mod event;
