//! Large-block path: per-request standalone mappings.

pub mod large;
