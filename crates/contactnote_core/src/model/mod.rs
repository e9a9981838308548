//! Domain model for contact notes.
//!
//! # Responsibility
//! - Define the validated records the core operates on.
//! - Keep the persisted JSON shape stable across app versions.
//!
//! # Invariants
//! - Contacts produced by `RawContact::validate` (and so by `load_contacts`)
//!   have a non-empty `id` and a non-blank `name`. `Contact::new` and decoded
//!   note entries carry whatever the caller or store supplied.
//! - Note entries embed a copy of their contact, never a reference.

pub mod contact;
pub mod note;
