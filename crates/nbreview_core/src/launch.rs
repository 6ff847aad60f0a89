//! Launch parameter parsing.
//!
//! The host page is opened with `?notebook_url=<location>`. The value is used
//! verbatim (no percent-decoding) both for the viewer address and as the
//! `notebook_url` stamped into the review note.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static NOTEBOOK_URL_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[?&])notebook_url=([^&#]*)").expect("valid notebook_url regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    MissingNotebookUrl,
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNotebookUrl => {
                write!(f, "Please provide a notebook URL in the query parameters")
            }
        }
    }
}

impl Error for LaunchError {}

/// Parameters the host page was launched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchParams {
    notebook_url: String,
}

impl LaunchParams {
    pub fn new(notebook_url: impl Into<String>) -> Result<Self, LaunchError> {
        let notebook_url = notebook_url.into();
        if notebook_url.trim().is_empty() {
            return Err(LaunchError::MissingNotebookUrl);
        }
        Ok(Self { notebook_url })
    }

    /// Extracts `notebook_url` from a raw query string.
    pub fn from_query(query: &str) -> Result<Self, LaunchError> {
        let value = NOTEBOOK_URL_PARAM_RE
            .captures(query)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(LaunchError::MissingNotebookUrl)?;
        Self::new(value)
    }

    /// Source document location, as given.
    pub fn notebook_url(&self) -> &str {
        self.notebook_url.as_str()
    }

    /// Address of the embedded viewer for this notebook.
    pub fn viewer_url(&self, viewer_base_url: &str) -> String {
        format!("{viewer_base_url}?url={}&embedded=1", self.notebook_url)
    }
}
