//! Review session state.
//!
//! # Responsibility
//! - Hold the current answers and reviewer name for one reviewer.
//! - Re-hydrate from every inbound snapshot and produce updated documents
//!   for every local edit.
//!
//! # Invariants
//! - `Uninitialized` until the first snapshot; `Loaded` afterwards.
//! - The held document is never mutated in place; edits clone, patch and
//!   replace it.
//! - A local edit carries the full in-memory answers, not a diff against
//!   the last snapshot.

use crate::codec::review_note;
use crate::model::notebook::Notebook;
use crate::model::review::{Answers, ReviewPatch};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Lifecycle state of a review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No snapshot received yet.
    Uninitialized,
    /// At least one snapshot received.
    Loaded,
}

/// Reasons an edit could not produce an updated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No snapshot has been received yet.
    NotLoaded,
    /// The loaded document has no cells to carry the review note.
    EmptyDocument,
    /// The viewer frame is not attached, so the edit could not be delivered.
    FrameDetached,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "no notebook loaded yet"),
            Self::EmptyDocument => write!(f, "notebook has no cells"),
            Self::FrameDetached => write!(f, "notebook viewer is not attached"),
        }
    }
}

impl Error for SessionError {}

/// One reviewer editing one notebook.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    session_id: Uuid,
    document_url: String,
    document: Option<Notebook>,
    answers: Answers,
    reviewer_name: String,
}

impl ReviewSession {
    /// Creates an uninitialized session for the notebook at `document_url`.
    pub fn new(document_url: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            document_url: document_url.into(),
            document: None,
            answers: Answers::new(),
            reviewer_name: String::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> SessionState {
        if self.document.is_some() {
            SessionState::Loaded
        } else {
            SessionState::Uninitialized
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == SessionState::Loaded
    }

    pub fn document_url(&self) -> &str {
        self.document_url.as_str()
    }

    /// Last snapshot, including any local edits applied since.
    pub fn document(&self) -> Option<&Notebook> {
        self.document.as_ref()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn reviewer_name(&self) -> &str {
        self.reviewer_name.as_str()
    }

    /// Replaces the held document and re-hydrates answers from it.
    ///
    /// Answers are reset when the snapshot has no review note. The reviewer
    /// name is only replaced by a non-empty stored name.
    pub fn on_snapshot(&mut self, document: Notebook) {
        match review_note::decode(document.first_cell_notes()) {
            Some(payload) => {
                self.answers = payload.answers;
                if !payload.reviewer_name.is_empty() {
                    self.reviewer_name = payload.reviewer_name;
                }
            }
            None => self.answers.clear(),
        }
        self.document = Some(document);
    }

    /// Sets one answer and returns the updated document to send.
    ///
    /// Nothing changes when no usable document is loaded.
    pub fn on_answer_changed(
        &mut self,
        question_id: impl Into<String>,
        value: i64,
    ) -> Result<Notebook, SessionError> {
        self.ensure_writable()?;
        let mut answers = self.answers.clone();
        answers.insert(question_id.into(), value);
        self.answers = answers.clone();

        let patch = ReviewPatch::answers(answers).with_reviewer_name(self.reviewer_name.clone());
        self.write_patch(&patch)
    }

    /// Stores the reviewer name without touching the document.
    pub fn set_reviewer_name(&mut self, name: impl Into<String>) {
        self.reviewer_name = name.into();
    }

    /// Stores the reviewer name and returns the updated document to send.
    ///
    /// The name is kept even when no document is loaded, so the next edit
    /// that can be written carries it.
    pub fn on_reviewer_name_changed(
        &mut self,
        name: impl Into<String>,
    ) -> Result<Notebook, SessionError> {
        self.set_reviewer_name(name);
        self.ensure_writable()?;
        let patch = ReviewPatch::reviewer_name(self.reviewer_name.clone());
        self.write_patch(&patch)
    }

    fn ensure_writable(&self) -> Result<&Notebook, SessionError> {
        let document = self.document.as_ref().ok_or(SessionError::NotLoaded)?;
        if document.cells.is_empty() {
            return Err(SessionError::EmptyDocument);
        }
        Ok(document)
    }

    fn write_patch(&mut self, patch: &ReviewPatch) -> Result<Notebook, SessionError> {
        let document = self.ensure_writable()?;
        let notes = review_note::upsert(
            document.first_cell_notes(),
            patch,
            self.document_url.as_str(),
        );
        let updated = document
            .with_first_cell_notes(notes)
            .ok_or(SessionError::EmptyDocument)?;
        self.document = Some(updated.clone());
        Ok(updated)
    }
}
