//! Core domain logic for ContactNote.
//! This crate is the single source of truth for note and search invariants.

pub mod contacts;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use contacts::{
    load_contacts, ContactField, ContactSort, ContactSource, ContactSourceError,
    ContactValidationError, FetchRequest, RawContact, RawContactImage, StaticContactSource,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::contact::{Contact, ContactImage};
pub use model::note::{NoteEntry, NoteId};
pub use repo::collection::{
    decode_collection, decode_notes, encode_collection, DecodedNotes, NoteCollection,
};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, NOTES_STORE_KEY};
pub use search::index::{SearchHit, SearchIndex, SearchOptions, DEFAULT_MIN_SCORE};
pub use search::scorer::{EditDistanceScorer, Scorer};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::save_queue::{SaveError, SaveProgress};
pub use store::{
    KeyValueStore, MemoryStore, SqliteKeyValueStore, StoreError, StoreResult, KV_SCHEMA_VERSION,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
