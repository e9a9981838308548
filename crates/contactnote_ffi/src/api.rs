//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note list and contact search use-cases to Dart via FRB.
//! - Own the single process-wide `NoteService` instance.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are returned as envelope messages, never as errors.
//! - Only one `NoteService` is active; switching paths drops (and flushes)
//!   the previous one.

use contactnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, load_contacts,
    ping as ping_inner, Contact, ContactField, FetchRequest, NoteEntry, NoteId, NoteRepository,
    NoteService, RawContact, RawContactImage, SearchIndex, SearchOptions, SqliteKeyValueStore,
    StaticContactSource,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

const NOTES_DB_FILE_NAME: &str = "contactnote.sqlite3";
const NOTES_DB_PATH_ENV: &str = "CONTACTNOTE_DB_PATH";

static ACTIVE_NOTES: OnceLock<Mutex<Option<ActiveNotes>>> = OnceLock::new();

struct ActiveNotes {
    db_path: PathBuf,
    service: NoteService,
}

/// Contact record exchanged with the Dart side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiContact {
    pub id: String,
    pub name: String,
    pub image_uri: Option<String>,
}

/// One note row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiNoteItem {
    pub note_id: String,
    pub contact: FfiContact,
    pub note: String,
}

/// Note list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    /// Notes, newest first.
    pub items: Vec<FfiNoteItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for note commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected note ID, when there is one.
    pub note_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<String>) -> Self {
        Self {
            ok: true,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Contact search envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSearchResponse {
    /// Matching contacts, best match first.
    pub items: Vec<FfiContact>,
    /// Number of input records dropped by validation.
    pub skipped: u32,
    pub message: String,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Opens the note store at `db_path` and loads stored notes.
///
/// Path resolution: `db_path` argument, then `CONTACTNOTE_DB_PATH`, then a
/// file in the system temp directory.
///
/// # FFI contract
/// - Sync call; performs the initial load.
/// - Re-opening the active path is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(db_path: Option<String>) -> NoteActionResponse {
    let path = resolve_notes_db_path(db_path);
    let mut active = lock_active_notes();
    if active.as_ref().is_some_and(|notes| notes.db_path == path) {
        return NoteActionResponse::success("Notes already open.", None);
    }

    match open_notes(path) {
        Ok(notes) => {
            let message = format!("Loaded {} note(s).", notes.service.notes().len());
            // Replacing drops the previous service, which flushes its queue.
            *active = Some(notes);
            NoteActionResponse::success(message, None)
        }
        Err(err) => NoteActionResponse::failure(format!("notes_open failed: {err}")),
    }
}

/// Lists notes newest first, opening the default store when needed.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    match with_notes(|service| {
        Ok(service
            .notes()
            .iter()
            .map(to_ffi_note_item)
            .collect::<Vec<_>>())
    }) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No notes yet.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesListResponse { items, message }
        }
        Err(err) => NotesListResponse {
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Attaches a note to `contact`; the save runs in the background.
///
/// # FFI contract
/// - Rejects contacts without id or name.
/// - Returns the created note ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_add(contact: FfiContact, note: String) -> NoteActionResponse {
    let contact = match RawContact::from(contact).validate() {
        Ok(contact) => contact,
        Err(err) => return NoteActionResponse::failure(format!("notes_add failed: {err}")),
    };

    match with_notes(|service| service.add_note(contact, note).map_err(|err| err.to_string())) {
        Ok(entry) => NoteActionResponse::success("Note saved.", Some(entry.id.to_string())),
        Err(err) => NoteActionResponse::failure(format!("notes_add failed: {err}")),
    }
}

/// Deletes one note by ID. Unknown IDs succeed without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(note_id: String) -> NoteActionResponse {
    let id = NoteId::from(note_id.trim());
    match with_notes(|service| Ok(service.delete_note(&id))) {
        Ok(true) => NoteActionResponse::success("Note deleted.", Some(id.to_string())),
        Ok(false) => NoteActionResponse::success("Note not found.", None),
        Err(err) => NoteActionResponse::failure(format!("notes_delete failed: {err}")),
    }
}

/// Blocks until every pending save has been written.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_flush() -> NoteActionResponse {
    match with_notes(|service| service.flush().map_err(|err| err.to_string())) {
        Ok(()) => NoteActionResponse::success("Notes saved.", None),
        Err(err) => NoteActionResponse::failure(format!("notes_flush failed: {err}")),
    }
}

/// Ranks platform contacts against `query`.
///
/// Input semantics:
/// - `contacts`: records as delivered by the platform, in display order.
/// - `query`: empty returns every valid contact unchanged.
/// - `limit`: `None` or `0` means unlimited.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_search(
    contacts: Vec<FfiContact>,
    query: String,
    limit: Option<u32>,
) -> ContactSearchResponse {
    let received = contacts.len();
    let source = StaticContactSource::new(contacts.into_iter().map(RawContact::from).collect());
    let request = FetchRequest {
        fields: vec![ContactField::Id, ContactField::Name, ContactField::Image],
        sort: None,
    };
    let valid = load_contacts(&source, &request);
    let skipped = u32::try_from(received - valid.len()).unwrap_or(u32::MAX);

    let options = SearchOptions {
        limit: limit.filter(|value| *value > 0).map(|value| value as usize),
        ..SearchOptions::default()
    };
    let items = SearchIndex::build(valid)
        .with_options(options)
        .query(query.as_str())
        .into_iter()
        .map(FfiContact::from)
        .collect::<Vec<_>>();

    let message = if items.is_empty() {
        "No contacts.".to_string()
    } else {
        format!("Found {} contact(s).", items.len())
    };
    ContactSearchResponse {
        items,
        skipped,
        message,
    }
}

impl From<FfiContact> for RawContact {
    fn from(value: FfiContact) -> Self {
        Self {
            id: Some(value.id),
            name: Some(value.name),
            image: value.image_uri.map(|uri| RawContactImage { uri: Some(uri) }),
        }
    }
}

impl From<Contact> for FfiContact {
    fn from(value: Contact) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image_uri: value.image.map(|image| image.uri),
        }
    }
}

fn to_ffi_note_item(entry: &NoteEntry) -> FfiNoteItem {
    FfiNoteItem {
        note_id: entry.id.to_string(),
        contact: FfiContact::from(entry.contact.clone()),
        note: entry.note.clone(),
    }
}

fn resolve_notes_db_path(db_path: Option<String>) -> PathBuf {
    let explicit = db_path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    if let Ok(raw) = std::env::var(NOTES_DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(NOTES_DB_FILE_NAME)
}

fn lock_active_notes() -> MutexGuard<'static, Option<ActiveNotes>> {
    ACTIVE_NOTES
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn open_notes(db_path: PathBuf) -> Result<ActiveNotes, String> {
    let store = SqliteKeyValueStore::open(&db_path)
        .map_err(|err| format!("notes DB open failed: {err}"))?;
    let service = NoteService::open(NoteRepository::new(store))
        .map_err(|err| format!("notes service init failed: {err}"))?;
    Ok(ActiveNotes { db_path, service })
}

fn with_notes<T>(f: impl FnOnce(&mut NoteService) -> Result<T, String>) -> Result<T, String> {
    let mut active = lock_active_notes();
    if active.is_none() {
        warn!("event=notes_open module=ffi status=implicit");
        *active = Some(open_notes(resolve_notes_db_path(None))?);
    }
    match active.as_mut() {
        Some(notes) => f(&mut notes.service),
        None => Err("notes store is not open".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        contacts_search, core_version, init_logging, notes_add, notes_delete, notes_flush,
        notes_list, notes_open, ping, FfiContact,
    };

    fn ffi_contact(id: &str, name: &str) -> FfiContact {
        FfiContact {
            id: id.to_string(),
            name: name.to_string(),
            image_uri: None,
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn contacts_search_ranks_and_skips_invalid_records() {
        let response = contacts_search(
            vec![
                ffi_contact("1", "Jon Stark"),
                ffi_contact("", "No Id"),
                ffi_contact("2", "Jon Snow"),
            ],
            "Jon Snw".to_string(),
            None,
        );
        assert_eq!(response.skipped, 1);
        let ids: Vec<&str> = response.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn contacts_search_empty_query_keeps_platform_order() {
        let response = contacts_search(
            vec![ffi_contact("b", "Zed"), ffi_contact("a", "Amy")],
            String::new(),
            Some(0),
        );
        let ids: Vec<&str> = response.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn notes_round_trip_through_ffi() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ffi-notes.sqlite3");
        let opened = notes_open(Some(path.to_string_lossy().into_owned()));
        assert!(opened.ok, "{}", opened.message);

        let created = notes_add(ffi_contact("c1", "Ana"), "call back".to_string());
        assert!(created.ok, "{}", created.message);
        let note_id = created.note_id.expect("created note should return note_id");

        let listed = notes_list();
        assert_eq!(listed.items[0].note_id, note_id);
        assert_eq!(listed.items[0].contact.name, "Ana");

        let rejected = notes_add(ffi_contact("c2", "  "), String::new());
        assert!(!rejected.ok);

        let deleted = notes_delete(note_id.clone());
        assert!(deleted.ok);
        assert_eq!(deleted.note_id.as_deref(), Some(note_id.as_str()));
        let repeated = notes_delete(note_id);
        assert!(repeated.ok);
        assert!(repeated.note_id.is_none());

        let flushed = notes_flush();
        assert!(flushed.ok, "{}", flushed.message);
    }
}
