//! Read-only question catalog interface.
//!
//! The catalog content belongs to the host; the core only knows its shape.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One selectable score for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: i64,
    pub label: String,
}

/// One catalog question keyed by an opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Returns the label for `value`, if the question offers it.
    pub fn option_label(&self, value: i64) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Json(serde_json::Error),
    DuplicateQuestionId(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid question catalog: {err}"),
            Self::DuplicateQuestionId(id) => write!(f, "duplicate question id: `{id}`"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateQuestionId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Parses a JSON array of questions, rejecting duplicate ids.
pub fn parse_catalog(json: &str) -> Result<Vec<Question>, CatalogError> {
    let questions: Vec<Question> = serde_json::from_str(json)?;
    for (index, question) in questions.iter().enumerate() {
        if questions[..index].iter().any(|prior| prior.id == question.id) {
            return Err(CatalogError::DuplicateQuestionId(question.id.clone()));
        }
    }
    Ok(questions)
}
