//! Flutter-facing FFI surface for ContactNote core.

pub mod api;
