//! Contact name index and ranked query.
//!
//! # Responsibility
//! - Snapshot a contact sequence with normalized name keys.
//! - Answer ranked fuzzy queries through a pluggable `Scorer`.
//!
//! # Invariants
//! - An empty query returns every contact in original order.
//! - Results are a subset of the indexed contacts, never longer than it.
//! - Equal scores keep original input order.
//! - Queries never panic, including for whitespace-only text.

use crate::model::contact::Contact;
use crate::search::scorer::{EditDistanceScorer, Scorer};
use log::debug;

/// Minimum similarity for a contact to be returned by default.
pub const DEFAULT_MIN_SCORE: f64 = 0.4;

/// Ranking options applied on top of the scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Contacts scoring below this value are dropped.
    pub min_score: f64,
    /// Maximum number of ranked results; `None` keeps all.
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            limit: None,
        }
    }
}

/// One ranked query result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub contact: &'a Contact,
    pub score: f64,
    /// Index of the contact in the sequence the index was built from.
    pub position: usize,
}

#[derive(Debug, Clone)]
struct IndexedContact {
    contact: Contact,
    key: String,
}

/// Immutable search index over one contact snapshot.
///
/// Rebuild the index whenever the contact list changes; an index never
/// observes later changes to its source.
#[derive(Debug, Clone)]
pub struct SearchIndex<S: Scorer = EditDistanceScorer> {
    entries: Vec<IndexedContact>,
    scorer: S,
    options: SearchOptions,
}

impl SearchIndex<EditDistanceScorer> {
    /// Builds an index with the default scorer and options.
    pub fn build(contacts: impl IntoIterator<Item = Contact>) -> Self {
        Self::with_scorer(contacts, EditDistanceScorer)
    }
}

impl<S: Scorer> SearchIndex<S> {
    /// Builds an index using a caller-provided scorer.
    pub fn with_scorer(contacts: impl IntoIterator<Item = Contact>, scorer: S) -> Self {
        let entries = contacts
            .into_iter()
            .map(|contact| IndexedContact {
                key: normalize_key(contact.name.as_str()),
                contact,
            })
            .collect();
        Self {
            entries,
            scorer,
            options: SearchOptions::default(),
        }
    }

    /// Replaces ranking options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed contacts in original order.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.entries.iter().map(|entry| &entry.contact)
    }

    /// Returns matching contacts ordered best-first.
    ///
    /// An empty `text` returns every contact unfiltered, in original order.
    pub fn query(&self, text: &str) -> Vec<Contact> {
        self.search(text)
            .into_iter()
            .map(|hit| hit.contact.clone())
            .collect()
    }

    /// Returns scored hits ordered best-first.
    ///
    /// An empty `text` yields every contact with score `1.0`, in original
    /// order. The configured limit applies only to non-empty queries.
    pub fn search(&self, text: &str) -> Vec<SearchHit<'_>> {
        if text.is_empty() {
            return self
                .entries
                .iter()
                .enumerate()
                .map(|(position, entry)| SearchHit {
                    contact: &entry.contact,
                    score: 1.0,
                    position,
                })
                .collect();
        }

        let query = normalize_key(text);
        let mut hits: Vec<SearchHit<'_>> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let score = self.scorer.score(query.as_str(), entry.key.as_str());
                (score.is_finite() && score >= self.options.min_score).then_some(SearchHit {
                    contact: &entry.contact,
                    score,
                    position,
                })
            })
            .collect();

        // Stable sort keeps input order for equal scores.
        hits.sort_by(|left, right| right.score.total_cmp(&left.score));
        if let Some(limit) = self.options.limit {
            hits.truncate(limit);
        }

        debug!(
            "event=contact_search module=search status=ok candidates={} hits={}",
            self.entries.len(),
            hits.len()
        );
        hits
    }
}

/// Lowercases and collapses runs of whitespace into single spaces.
///
/// Whitespace-only input normalizes to an empty key.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
