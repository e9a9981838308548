//! Fuzzy contact search.
//!
//! # Responsibility
//! - Build a name index over a contact snapshot.
//! - Rank contacts by approximate name similarity.

pub mod index;
pub mod scorer;
