//! Key-value repository contracts and implementations.
//!
//! # Responsibility
//! - Provide the opaque string-keyed get/set store used for persisted
//!   entries.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Keys must be non-empty after trimming.
//! - `set_item` overwrites the whole value for a key.
//! - Clones of one repository share the same underlying entries.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for key-value persistence operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidKey(String),
    Db(DbError),
    /// A previous holder of the backend lock panicked.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "storage backend lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Opaque string-keyed persistent store.
pub trait KeyValueRepository {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// In-memory repository; used as the test fake and for ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueRepository {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryKeyValueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let repo = Self::new();
        if let Ok(mut entries) = repo.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        repo
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl KeyValueRepository for MemoryKeyValueRepository {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed repository over the `kv_entries` table.
///
/// The connection must come from `db::open_db`/`open_db_in_memory` so the
/// schema is already migrated.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueRepository {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl KeyValueRepository for SqliteKeyValueRepository {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

fn normalize_key(key: &str) -> RepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}
