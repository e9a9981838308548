//! Note use-case service.
//!
//! # Responsibility
//! - Hold the single writable copy of the note collection.
//! - Turn each mutation into a new revision and schedule its save.
//!
//! # Invariants
//! - Revisions increase by one per effective mutation.
//! - Removing an unknown id neither bumps the revision nor saves.
//! - Save failures never roll back in-memory state.

use crate::model::contact::Contact;
use crate::model::note::{NoteEntry, NoteId};
use crate::repo::collection::NoteCollection;
use crate::repo::note_repo::NoteRepository;
use crate::service::save_queue::{SaveError, SaveProgress, SaveQueue};
use crate::store::KeyValueStore;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteServiceError {
    Save(SaveError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Save(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<SaveError> for NoteServiceError {
    fn from(value: SaveError) -> Self {
        Self::Save(value)
    }
}

/// Controller owning the note collection and its save queue.
pub struct NoteService {
    notes: NoteCollection,
    revision: u64,
    queue: SaveQueue,
}

impl NoteService {
    /// Loads stored notes (empty on failure) and starts the save worker.
    ///
    /// # Errors
    /// - `Save(Spawn)` when the worker thread cannot be started.
    pub fn open<S>(repo: NoteRepository<S>) -> Result<Self, NoteServiceError>
    where
        S: KeyValueStore + 'static,
    {
        let notes = repo.load_or_empty();
        let queue = SaveQueue::start(repo)?;
        info!(
            "event=notes_open module=service status=ok count={}",
            notes.len()
        );
        Ok(Self {
            notes,
            revision: 0,
            queue,
        })
    }

    /// Current collection, newest first.
    pub fn notes(&self) -> &NoteCollection {
        &self.notes
    }

    pub fn snapshot(&self) -> NoteCollection {
        self.notes.clone()
    }

    /// Adds a note for `contact` and schedules a save.
    pub fn add_note(
        &mut self,
        contact: Contact,
        note: impl Into<String>,
    ) -> Result<NoteEntry, NoteServiceError> {
        self.notes = std::mem::take(&mut self.notes).add(contact, note);
        let created = self
            .notes
            .newest()
            .cloned()
            .ok_or(NoteServiceError::InconsistentState(
                "added note missing from collection head",
            ))?;
        self.schedule_save();
        Ok(created)
    }

    /// Deletes the note with `id`.
    ///
    /// Returns `false` (and schedules nothing) when no note matched.
    pub fn delete_note(&mut self, id: &NoteId) -> bool {
        if !self.notes.contains(id) {
            return false;
        }
        self.notes = std::mem::take(&mut self.notes).remove(id);
        self.schedule_save();
        true
    }

    /// Blocks until the current revision has been written.
    ///
    /// # Errors
    /// - `Save(Write)` when that write failed; in-memory state is unchanged.
    pub fn flush(&self) -> Result<(), NoteServiceError> {
        self.queue.wait_for(self.revision)?;
        Ok(())
    }

    /// Revision of the in-memory collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn save_progress(&self) -> SaveProgress {
        self.queue.progress()
    }

    fn schedule_save(&mut self) {
        self.revision += 1;
        if let Err(err) = self.queue.enqueue(self.revision, self.notes.clone()) {
            error!(
                "event=notes_save module=service status=error revision={} error_code=enqueue_failed error={}",
                self.revision, err
            );
        }
    }
}
