//! Persistent key-value store boundary.
//!
//! # Responsibility
//! - Define the get/set contract the note repository persists through.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - Values are UTF-8 text; the store never interprets them.
//! - `set` replaces the whole value for a key in one write.

pub mod memory;
pub mod sqlite;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use memory::MemoryStore;
pub use sqlite::{SqliteKeyValueStore, KV_SCHEMA_VERSION};

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport-level failure raised by a store implementation.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The SQLite file was written by a newer `kv_store` schema.
    UnsupportedSchemaVersion { db_version: u32, supported: u32 },
    /// A previous holder of the store lock panicked.
    Poisoned,
    /// Host-provided store reported a failure.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {supported}"
            ),
            Self::Poisoned => write!(f, "store lock poisoned"),
            Self::Backend(message) => write!(f, "store backend failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Poisoned | Self::Backend(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Key-value text storage used for note persistence.
///
/// Implementations must be `Send` so the save queue can own them on its
/// worker thread.
pub trait KeyValueStore: Send {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}
