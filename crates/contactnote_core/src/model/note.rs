//! Note entry model.
//!
//! # Responsibility
//! - Pair a contact snapshot with free-text note content.
//! - Generate local note identifiers.
//!
//! # Invariants
//! - Note entries are never edited in place; edits are delete + add.
//! - Generated ids carry 48 bits of randomness.

use crate::model::contact::Contact;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_ID_LEN: usize = 12;

/// Locally generated note identifier.
///
/// Serialized as a bare string. Ids written by older clients are accepted
/// as-is, whatever their length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        let mut value = Uuid::new_v4().simple().to_string();
        value.truncate(NOTE_ID_LEN);
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted note attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub id: NoteId,
    /// Snapshot of the contact at the time the note was written.
    pub contact: Contact,
    /// Free text; may be empty.
    pub note: String,
}

impl NoteEntry {
    /// Creates an entry with a generated id.
    pub fn new(contact: Contact, note: impl Into<String>) -> Self {
        Self::with_id(NoteId::generate(), contact, note)
    }

    /// Creates an entry with a caller-provided id.
    pub fn with_id(id: NoteId, contact: Contact, note: impl Into<String>) -> Self {
        Self {
            id,
            contact,
            note: note.into(),
        }
    }
}
