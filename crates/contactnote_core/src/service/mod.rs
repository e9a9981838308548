//! Core use-case services.
//!
//! # Responsibility
//! - Own the authoritative in-memory note collection.
//! - Serialize persistence through one background writer.

pub mod note_service;
pub mod save_queue;
