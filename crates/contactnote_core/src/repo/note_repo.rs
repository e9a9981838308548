//! Note repository over a key-value store.
//!
//! # Responsibility
//! - Load the whole note collection from one fixed key.
//! - Save the whole collection back under the same key.
//!
//! # Invariants
//! - A missing key loads as an empty collection.
//! - Malformed stored text is reported, never partially applied.
//! - A repeated note id keeps its first entry; the other entries survive.
//! - `load_or_empty` never fails and never panics.

use crate::repo::collection::{decode_notes, encode_collection, NoteCollection};
use crate::store::{KeyValueStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Store key used by every app version for the note list.
pub const NOTES_STORE_KEY: &str = "contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note load/save.
#[derive(Debug)]
pub enum RepoError {
    /// Stored text is not a valid note array.
    Deserialization(serde_json::Error),
    Serialization(serde_json::Error),
    StoreRead(StoreError),
    StoreWrite(StoreError),
}

impl RepoError {
    /// Stable short code for log lines and FFI messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Deserialization(_) => "deserialization_failed",
            Self::Serialization(_) => "serialization_failed",
            Self::StoreRead(_) => "store_read_failed",
            Self::StoreWrite(_) => "store_write_failed",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deserialization(err) => write!(f, "stored notes are malformed: {err}"),
            Self::Serialization(err) => write!(f, "failed to serialize notes: {err}"),
            Self::StoreRead(err) => write!(f, "failed to read notes: {err}"),
            Self::StoreWrite(err) => write!(f, "failed to write notes: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Deserialization(err) | Self::Serialization(err) => Some(err),
            Self::StoreRead(err) | Self::StoreWrite(err) => Some(err),
        }
    }
}

/// Whole-collection persistence bound to one store key.
pub struct NoteRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> NoteRepository<S> {
    /// Creates a repository using the default `contacts` key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, NOTES_STORE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads and decodes the stored collection.
    ///
    /// # Errors
    /// - `StoreRead` when the store cannot be read.
    /// - `Deserialization` when stored text is not a note array.
    ///
    /// # Side effects
    /// - Emits a `notes_load` warn event when repeated ids were dropped.
    pub fn load(&self) -> RepoResult<NoteCollection> {
        let raw = self
            .store
            .get(self.key.as_str())
            .map_err(RepoError::StoreRead)?;
        match raw {
            None => Ok(NoteCollection::new()),
            Some(raw) => {
                let decoded =
                    decode_notes(raw.as_str()).map_err(RepoError::Deserialization)?;
                if !decoded.dropped_duplicates.is_empty() {
                    warn!(
                        "event=notes_load module=repo status=partial dropped_duplicates={} kept={}",
                        decoded.dropped_duplicates.len(),
                        decoded.collection.len()
                    );
                }
                Ok(decoded.collection)
            }
        }
    }

    /// Loads the stored collection, falling back to empty on any failure.
    ///
    /// # Side effects
    /// - Emits `notes_load` logging events with entry count or error code.
    pub fn load_or_empty(&self) -> NoteCollection {
        let started_at = Instant::now();
        match self.load() {
            Ok(collection) => {
                info!(
                    "event=notes_load module=repo status=ok count={} duration_ms={}",
                    collection.len(),
                    started_at.elapsed().as_millis()
                );
                collection
            }
            Err(err) => {
                error!(
                    "event=notes_load module=repo status=error error_code={} error={}",
                    err.code(),
                    err
                );
                warn!("event=notes_load module=repo status=fallback count=0");
                NoteCollection::new()
            }
        }
    }

    /// Encodes and writes the whole collection.
    ///
    /// # Errors
    /// - `StoreWrite` when the underlying write fails; callers keep their
    ///   in-memory state.
    pub fn save(&self, collection: &NoteCollection) -> RepoResult<()> {
        let raw = encode_collection(collection).map_err(RepoError::Serialization)?;
        self.store
            .set(self.key.as_str(), raw.as_str())
            .map_err(RepoError::StoreWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteRepository, RepoError, NOTES_STORE_KEY};
    use crate::model::contact::Contact;
    use crate::repo::collection::NoteCollection;
    use crate::store::{KeyValueStore, MemoryStore, StoreError, StoreResult};

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Backend("read-only".to_string()))
        }
    }

    #[test]
    fn missing_key_loads_empty_collection() {
        let repo = NoteRepository::new(MemoryStore::new());
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_text_is_a_deserialization_error() {
        let repo = NoteRepository::new(MemoryStore::with_value(NOTES_STORE_KEY, "{not json"));
        let err = repo.load().unwrap_err();
        assert!(matches!(err, RepoError::Deserialization(_)));
        assert_eq!(err.code(), "deserialization_failed");
    }

    #[test]
    fn load_or_empty_recovers_from_malformed_text() {
        let repo = NoteRepository::new(MemoryStore::with_value(NOTES_STORE_KEY, "{not json"));
        assert!(repo.load_or_empty().is_empty());
    }

    #[test]
    fn repeated_ids_keep_first_entry_and_the_rest_of_the_notes() {
        let raw = r#"[
            {"id":"a","contact":{"id":"c1","name":"Ana"},"note":"first"},
            {"id":"b","contact":{"id":"c2","name":"Ben"},"note":"second"},
            {"id":"a","contact":{"id":"c3","name":"Cy"},"note":"stale"}
        ]"#;
        let repo = NoteRepository::new(MemoryStore::with_value(NOTES_STORE_KEY, raw));
        let loaded = repo.load_or_empty();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.entries()[0].note, "first");
        assert_eq!(loaded.entries()[1].note, "second");
    }

    #[test]
    fn save_writes_under_configured_key() {
        let store = MemoryStore::new();
        let repo = NoteRepository::with_key(store.clone(), "notes_v2");
        let collection = NoteCollection::new().add(Contact::new("c1", "Ana"), "call back");
        repo.save(&collection).unwrap();

        assert!(store.get(NOTES_STORE_KEY).unwrap().is_none());
        assert!(store.get("notes_v2").unwrap().is_some());
        assert_eq!(repo.load().unwrap(), collection);
    }

    #[test]
    fn failed_write_is_reported_as_store_write_error() {
        let repo = NoteRepository::new(ReadOnlyStore);
        let err = repo.save(&NoteCollection::new()).unwrap_err();
        assert!(matches!(err, RepoError::StoreWrite(_)));
    }
}
