//! Newest-first note collection and its JSON codec.
//!
//! # Responsibility
//! - Apply add/remove as value transforms.
//! - Encode/decode the persisted JSON array shape.
//!
//! # Invariants
//! - New entries are prepended.
//! - `remove` of an unknown id is a no-op.
//! - Decoding keeps the first entry for a repeated id and drops the rest.

use crate::model::contact::Contact;
use crate::model::note::{NoteEntry, NoteId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered note entries, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteCollection {
    entries: Vec<NoteEntry>,
}

impl NoteCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from entries already in display order.
    ///
    /// Returns the first duplicated id when ids are not unique.
    pub fn from_entries(entries: Vec<NoteEntry>) -> Result<Self, NoteId> {
        if let Some(duplicate) = first_duplicate_id(&entries) {
            return Err(duplicate);
        }
        Ok(Self { entries })
    }

    /// Prepends a new entry for `contact` with a freshly generated id.
    pub fn add(mut self, contact: Contact, note: impl Into<String>) -> Self {
        let mut id = NoteId::generate();
        while self.contains(&id) {
            id = NoteId::generate();
        }
        self.entries.insert(0, NoteEntry::with_id(id, contact, note));
        self
    }

    /// Removes the entry with `id`; unchanged when no entry matches.
    pub fn remove(mut self, id: &NoteId) -> Self {
        if let Some(index) = self.position(id) {
            self.entries.remove(index);
        }
        self
    }

    pub fn get(&self, id: &NoteId) -> Option<&NoteEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.position(id).is_some()
    }

    /// Most recently added entry, if any.
    pub fn newest(&self) -> Option<&NoteEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NoteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<NoteEntry> {
        self.entries
    }

    fn position(&self, id: &NoteId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }
}

impl<'a> IntoIterator for &'a NoteCollection {
    type Item = &'a NoteEntry;
    type IntoIter = std::slice::Iter<'a, NoteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Result of decoding a stored collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedNotes {
    pub collection: NoteCollection,
    /// Ids of later entries dropped because an earlier entry used the same id.
    pub dropped_duplicates: Vec<NoteId>,
}

/// Serializes the whole collection to the stored JSON array form.
pub fn encode_collection(collection: &NoteCollection) -> serde_json::Result<String> {
    serde_json::to_string(collection)
}

/// Parses the stored JSON array form.
///
/// Repeated ids keep their first (newest) entry; later repeats are dropped
/// and reported in `dropped_duplicates`.
pub fn decode_notes(raw: &str) -> serde_json::Result<DecodedNotes> {
    let entries: Vec<NoteEntry> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(entries.len());
    let mut kept = Vec::with_capacity(entries.len());
    let mut dropped_duplicates = Vec::new();
    for entry in entries {
        if seen.contains(&entry.id) {
            dropped_duplicates.push(entry.id);
        } else {
            seen.insert(entry.id.clone());
            kept.push(entry);
        }
    }

    Ok(DecodedNotes {
        collection: NoteCollection { entries: kept },
        dropped_duplicates,
    })
}

/// Parses the stored JSON array form, dropping repeated ids silently.
pub fn decode_collection(raw: &str) -> serde_json::Result<NoteCollection> {
    decode_notes(raw).map(|decoded| decoded.collection)
}

fn first_duplicate_id(entries: &[NoteEntry]) -> Option<NoteId> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .find(|entry| !seen.insert(&entry.id))
        .map(|entry| entry.id.clone())
}

#[cfg(test)]
mod tests {
    use super::{decode_collection, decode_notes, encode_collection, NoteCollection};
    use crate::model::contact::Contact;
    use crate::model::note::NoteId;

    #[test]
    fn add_prepends_and_grows_by_one() {
        let collection = NoteCollection::new()
            .add(Contact::new("c1", "Ana"), "first")
            .add(Contact::new("c2", "Ben"), "second");

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.entries()[0].contact.id, "c2");
        assert_eq!(collection.entries()[1].contact.id, "c1");
        assert_ne!(collection.entries()[0].id, collection.entries()[1].id);
    }

    #[test]
    fn remove_unknown_id_returns_collection_unchanged() {
        let collection = NoteCollection::new().add(Contact::new("c1", "Ana"), "x");
        let before = collection.clone();
        let after = collection.remove(&NoteId::from("missing"));
        assert_eq!(after, before);
    }

    #[test]
    fn remove_keeps_relative_order_of_remaining_entries() {
        let collection = NoteCollection::new()
            .add(Contact::new("c1", "Ana"), "1")
            .add(Contact::new("c2", "Ben"), "2")
            .add(Contact::new("c3", "Cy"), "3");
        let middle = collection.entries()[1].id.clone();

        let after = collection.remove(&middle);
        let names: Vec<&str> = after.iter().map(|e| e.contact.name.as_str()).collect();
        assert_eq!(names, vec!["Cy", "Ana"]);
    }

    #[test]
    fn decode_reads_legacy_short_ids() {
        let raw = r#"[{"id":"V1StGX","contact":{"id":"c1","name":"Ana"},"note":""}]"#;
        let collection = decode_collection(raw).unwrap();
        assert_eq!(collection.entries()[0].id.as_str(), "V1StGX");
        assert!(collection.entries()[0].note.is_empty());
    }

    #[test]
    fn decode_keeps_first_entry_for_repeated_ids() {
        let raw = r#"[
            {"id":"a","contact":{"id":"c1","name":"Ana"},"note":"x"},
            {"id":"b","contact":{"id":"c2","name":"Ben"},"note":"y"},
            {"id":"a","contact":{"id":"c3","name":"Cy"},"note":"z"}
        ]"#;
        let decoded = decode_notes(raw).unwrap();

        let ids: Vec<&str> = decoded.collection.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(decoded.collection.entries()[0].contact.name, "Ana");
        assert_eq!(decoded.dropped_duplicates, vec![NoteId::from("a")]);
    }

    #[test]
    fn encode_then_decode_preserves_order_and_images() {
        let collection = NoteCollection::new()
            .add(Contact::new("c1", "Ana").with_image("file:///ana.png"), "a")
            .add(Contact::new("c2", "Ben"), "");
        let raw = encode_collection(&collection).unwrap();
        assert!(raw.starts_with('['));
        assert_eq!(decode_collection(&raw).unwrap(), collection);
    }
}
