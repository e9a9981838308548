//! Note persistence and collection state.
//!
//! # Responsibility
//! - Hold the newest-first note collection as a plain value.
//! - Load/save the whole collection through a `KeyValueStore`.
//!
//! # Invariants
//! - Note ids are unique within a collection.
//! - Mutation never touches storage; saving is a separate explicit step.

pub mod collection;
pub mod note_repo;
