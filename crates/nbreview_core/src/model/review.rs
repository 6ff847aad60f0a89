//! Structured review payload stored inside one notebook note.
//!
//! # Responsibility
//! - Define the decoded review payload and the partial patch applied to it.
//! - Own the wire names of the review note JSON.
//!
//! # Invariants
//! - The `type` discriminator is always `REVIEW_NOTE_KIND` on encode.
//! - Question ids are opaque strings and scores are arbitrary integers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Discriminator identifying this system's note among arbitrary notes.
pub const REVIEW_NOTE_KIND: &str = "dandi-ai-notebook-review";

/// Author recorded on review notes created by this system.
pub const REVIEW_NOTE_AUTHOR: &str = REVIEW_NOTE_KIND;

/// Question id to score mapping.
pub type Answers = BTreeMap<String, i64>;

/// Decoded review note payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "notebook_url", default)]
    pub document_url: String,
    #[serde(default)]
    pub reviewer_name: String,
    #[serde(default)]
    pub answers: Answers,
    /// Keys written by other producers; kept across merges.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl ReviewPayload {
    /// Creates an empty payload for `document_url` with no answers.
    pub fn new(document_url: impl Into<String>) -> Self {
        Self {
            kind: REVIEW_NOTE_KIND.to_string(),
            document_url: document_url.into(),
            reviewer_name: String::new(),
            answers: Answers::new(),
            rest: Map::new(),
        }
    }

    /// Shallow-merges `patch` over this payload.
    ///
    /// Fields absent from the patch keep their current value; the discriminator
    /// and document URL are left to the caller.
    pub fn merged(mut self, patch: &ReviewPatch) -> Self {
        if let Some(reviewer_name) = &patch.reviewer_name {
            self.reviewer_name = reviewer_name.clone();
        }
        if let Some(answers) = &patch.answers {
            self.answers = answers.clone();
        }
        self
    }
}

/// Partial review payload applied by `upsert`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub reviewer_name: Option<String>,
    pub answers: Option<Answers>,
}

impl ReviewPatch {
    pub fn reviewer_name(name: impl Into<String>) -> Self {
        Self {
            reviewer_name: Some(name.into()),
            answers: None,
        }
    }

    pub fn answers(answers: Answers) -> Self {
        Self {
            reviewer_name: None,
            answers: Some(answers),
        }
    }

    pub fn with_reviewer_name(mut self, name: impl Into<String>) -> Self {
        self.reviewer_name = Some(name.into());
        self
    }
}
