//! Device contact provider boundary.
//!
//! # Responsibility
//! - Define the read-only contact source contract.
//! - Validate untyped provider records before they enter the core.
//! - Convert provider failures into an empty result plus a diagnostic.
//!
//! # Invariants
//! - Only validated `Contact` values leave this module.
//! - `load_contacts` never fails and never retries.

mod raw;
mod source;

pub use raw::{ContactValidationError, RawContact, RawContactImage};
pub use source::{
    load_contacts, ContactField, ContactSort, ContactSource, ContactSourceError, FetchRequest,
    StaticContactSource,
};
