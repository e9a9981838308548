//! Similarity scoring strategies.
//!
//! # Responsibility
//! - Define the `Scorer` seam used by `SearchIndex`.
//! - Provide the default typo- and reorder-tolerant edit-distance scorer.
//!
//! # Invariants
//! - Scores are in `[0.0, 1.0]`; higher is better.
//! - Scoring never panics for any input, including empty strings.

use strsim::normalized_levenshtein;

/// Score given to a candidate that contains the query verbatim.
const SUBSTRING_SCORE: f64 = 0.9;

/// Similarity strategy between a query and one candidate name.
pub trait Scorer: Send + Sync {
    /// Returns a similarity in `[0.0, 1.0]`.
    fn score(&self, query: &str, candidate: &str) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn score(&self, query: &str, candidate: &str) -> f64 {
        self(query, candidate)
    }
}

/// Default scorer: token-aware normalized Levenshtein similarity.
///
/// The result is the best of:
/// - exact match (1.0) or verbatim substring ([`SUBSTRING_SCORE`]),
/// - whole-string normalized Levenshtein,
/// - mean over query tokens of the best candidate-token similarity, where a
///   candidate token starting with the query token counts as 1.0.
///
/// The token pass is what lets "snow jon" find "Jon Snow".
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistanceScorer;

impl Scorer for EditDistanceScorer {
    fn score(&self, query: &str, candidate: &str) -> f64 {
        let query = query.to_lowercase();
        let candidate = candidate.to_lowercase();

        if query == candidate {
            return 1.0;
        }
        if !query.trim().is_empty() && candidate.contains(query.as_str()) {
            return SUBSTRING_SCORE;
        }

        let whole = normalized_levenshtein(&query, &candidate);
        whole.max(token_similarity(&query, &candidate))
    }
}

fn token_similarity(query: &str, candidate: &str) -> f64 {
    let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
    if candidate_tokens.is_empty() {
        return 0.0;
    }

    let mut total = 0.0;
    let mut count = 0usize;
    for query_token in query.split_whitespace() {
        total += candidate_tokens
            .iter()
            .map(|token| token_score(query_token, token))
            .fold(0.0, f64::max);
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn token_score(query_token: &str, candidate_token: &str) -> f64 {
    if candidate_token.starts_with(query_token) {
        1.0
    } else {
        normalized_levenshtein(query_token, candidate_token)
    }
}
