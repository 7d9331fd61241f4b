//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract persisted entries are written through.
//! - Isolate SQLite details from the stores that own domain state.
//!
//! # Invariants
//! - Repositories store opaque strings; serialization belongs to callers.

pub mod kv_repo;
