//! Codecs for structured data embedded in notebook metadata.
//!
//! # Responsibility
//! - Locate, decode, create and re-encode this system's review note.
//!
//! # Invariants
//! - Codecs never mutate their input; they return new sequences.
//! - Foreign or malformed notes are skipped, never reported as errors.

pub mod review_note;
