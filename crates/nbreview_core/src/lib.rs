//! Core of the notebook review form.
//!
//! Synchronizes a reviewer's answers with a review note stored in the first
//! cell of a notebook owned by an embedded viewer.

pub mod bridge;
pub mod codec;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod launch;
pub mod logging;
pub mod model;
pub mod session;

pub use bridge::message::{BridgeMessage, SNAPSHOT_MESSAGE_TYPE, UPDATE_MESSAGE_TYPE};
pub use bridge::notebook_bridge::{FrameTarget, NotebookBridge};
pub use codec::review_note::{decode, find_review_note, upsert, upsert_at};
pub use config::{ConfigError, ReviewConfig};
pub use controller::ReviewController;
pub use debounce::{DebouncedInput, DEFAULT_DEBOUNCE};
pub use launch::{LaunchError, LaunchParams};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::notebook::{Cell, CellMetadata, Note, Notebook};
pub use model::question::{parse_catalog, CatalogError, Question, QuestionOption};
pub use model::review::{Answers, ReviewPatch, ReviewPayload, REVIEW_NOTE_AUTHOR, REVIEW_NOTE_KIND};
pub use session::{ReviewSession, SessionError, SessionState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
