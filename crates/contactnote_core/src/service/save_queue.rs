//! Single-writer, coalescing save queue.
//!
//! # Responsibility
//! - Own the note repository on one worker thread.
//! - Persist snapshots strictly in submission order.
//! - Publish per-revision save progress to waiters.
//!
//! # Invariants
//! - At most one store write is in flight at any time.
//! - A snapshot is never written after a newer one; queued snapshots that
//!   are superseded before the worker reaches them are skipped.
//! - Dropping the queue finishes the in-flight write before returning.

use crate::repo::collection::NoteCollection;
use crate::repo::note_repo::NoteRepository;
use crate::store::KeyValueStore;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WORKER_THREAD_NAME: &str = "contactnote-save";

/// Failure observed while persisting through the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// The store write for the awaited revision failed.
    Write(String),
    /// The worker is gone; nothing more will be persisted.
    QueueClosed,
    /// The worker thread could not be started.
    Spawn(String),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write(message) => write!(f, "save failed: {message}"),
            Self::QueueClosed => write!(f, "save queue is closed"),
            Self::Spawn(message) => write!(f, "failed to start save worker: {message}"),
        }
    }
}

impl Error for SaveError {}

/// Snapshot of persistence progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveProgress {
    /// Highest revision the worker has attempted or skipped.
    pub settled_revision: u64,
    /// Highest revision written successfully.
    pub persisted_revision: u64,
    /// Error of the most recent attempt, if it failed.
    pub last_error: Option<String>,
    /// Set once the worker has exited.
    pub stopped: bool,
}

#[derive(Default)]
struct ProgressCell {
    state: Mutex<SaveProgress>,
    changed: Condvar,
}

impl ProgressCell {
    fn lock(&self) -> MutexGuard<'_, SaveProgress> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, revision: u64, outcome: Result<(), String>) {
        let mut state = self.lock();
        state.settled_revision = state.settled_revision.max(revision);
        match outcome {
            Ok(()) => {
                state.persisted_revision = state.persisted_revision.max(revision);
                state.last_error = None;
            }
            Err(message) => state.last_error = Some(message),
        }
        self.changed.notify_all();
    }

    fn mark_stopped(&self) {
        self.lock().stopped = true;
        self.changed.notify_all();
    }
}

/// Marks the queue stopped when the worker exits, even by panic.
struct StopGuard(Arc<ProgressCell>);

impl Drop for StopGuard {
    fn drop(&mut self) {
        self.0.mark_stopped();
    }
}

struct SaveJob {
    revision: u64,
    snapshot: NoteCollection,
}

/// Handle to the background writer.
pub struct SaveQueue {
    sender: Option<Sender<SaveJob>>,
    worker: Option<JoinHandle<()>>,
    progress: Arc<ProgressCell>,
}

impl SaveQueue {
    /// Moves `repo` onto a new worker thread.
    ///
    /// Revisions start at zero; the first enqueued revision should be 1.
    pub fn start<S>(repo: NoteRepository<S>) -> Result<Self, SaveError>
    where
        S: KeyValueStore + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let progress = Arc::new(ProgressCell::default());
        let worker_progress = Arc::clone(&progress);

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(repo, receiver, worker_progress))
            .map_err(|err| SaveError::Spawn(err.to_string()))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            progress,
        })
    }

    /// Submits a snapshot for `revision`.
    ///
    /// Revisions must be submitted in increasing order.
    pub fn enqueue(&self, revision: u64, snapshot: NoteCollection) -> Result<(), SaveError> {
        let sender = self.sender.as_ref().ok_or(SaveError::QueueClosed)?;
        sender
            .send(SaveJob { revision, snapshot })
            .map_err(|_| SaveError::QueueClosed)
    }

    /// Blocks until `revision` has been attempted (or superseded).
    ///
    /// # Errors
    /// - `Write` when the latest attempt covering `revision` failed.
    /// - `QueueClosed` when the worker stopped before reaching `revision`.
    pub fn wait_for(&self, revision: u64) -> Result<(), SaveError> {
        let mut state = self.progress.lock();
        while state.settled_revision < revision && !state.stopped {
            state = self
                .progress
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.persisted_revision >= revision {
            return Ok(());
        }
        if state.settled_revision < revision {
            return Err(SaveError::QueueClosed);
        }
        Err(SaveError::Write(
            state
                .last_error
                .clone()
                .unwrap_or_else(|| "superseded by a failed save".to_string()),
        ))
    }

    pub fn progress(&self) -> SaveProgress {
        self.progress.lock().clone()
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=save_queue module=service status=error error_code=worker_panicked");
            }
        }
    }
}

fn run_worker<S: KeyValueStore>(
    repo: NoteRepository<S>,
    receiver: Receiver<SaveJob>,
    progress: Arc<ProgressCell>,
) {
    let _guard = StopGuard(Arc::clone(&progress));
    debug!("event=save_queue module=service status=start");

    while let Ok(mut job) = receiver.recv() {
        let mut superseded = 0usize;
        while let Ok(newer) = receiver.try_recv() {
            job = newer;
            superseded += 1;
        }

        let started_at = Instant::now();
        let outcome = repo.save(&job.snapshot);
        match &outcome {
            Ok(()) => info!(
                "event=notes_save module=service status=ok revision={} count={} superseded={} duration_ms={}",
                job.revision,
                job.snapshot.len(),
                superseded,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=notes_save module=service status=error revision={} error_code={} error={}",
                job.revision,
                err.code(),
                err
            ),
        }
        progress.record(job.revision, outcome.map_err(|err| err.to_string()));
    }

    debug!("event=save_queue module=service status=stopped");
}

#[cfg(test)]
mod tests {
    use super::{SaveError, SaveQueue};
    use crate::model::contact::Contact;
    use crate::repo::collection::NoteCollection;
    use crate::repo::note_repo::NoteRepository;
    use crate::store::{KeyValueStore, MemoryStore};

    #[test]
    fn wait_for_zero_returns_immediately() {
        let queue = SaveQueue::start(NoteRepository::new(MemoryStore::new())).unwrap();
        assert_eq!(queue.wait_for(0), Ok(()));
    }

    #[test]
    fn enqueued_snapshot_is_persisted() {
        let store = MemoryStore::new();
        let queue = SaveQueue::start(NoteRepository::new(store.clone())).unwrap();
        let snapshot = NoteCollection::new().add(Contact::new("c1", "Ana"), "hi");

        queue.enqueue(1, snapshot.clone()).unwrap();
        queue.wait_for(1).unwrap();

        let repo = NoteRepository::new(store);
        assert_eq!(repo.load().unwrap(), snapshot);
        assert_eq!(queue.progress().persisted_revision, 1);
    }

    #[test]
    fn drop_finishes_pending_writes() {
        let store = MemoryStore::new();
        {
            let queue = SaveQueue::start(NoteRepository::new(store.clone())).unwrap();
            queue.enqueue(1, NoteCollection::new()).unwrap();
        }
        assert_eq!(store.get("contacts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn save_error_messages_are_readable() {
        assert_eq!(SaveError::QueueClosed.to_string(), "save queue is closed");
    }
}
