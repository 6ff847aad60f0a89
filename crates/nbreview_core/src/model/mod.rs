//! Domain model for reviewed notebooks and their review notes.
//!
//! # Responsibility
//! - Define the notebook shape as seen by the host (cells, metadata, notes).
//! - Define the structured review payload stored inside one note.
//! - Define the read-only question catalog interface.
//!
//! # Invariants
//! - The embedded viewer owns the notebook; the host only holds a transient
//!   copy per received snapshot.
//! - Unknown notebook, cell, metadata and note keys survive decode/encode.

pub mod notebook;
pub mod question;
pub mod review;
