//! Debounced text input adapter.
//!
//! # Responsibility
//! - Keep a local draft that follows every keystroke immediately.
//! - Emit one commit per debounce window, carrying the latest draft.
//!
//! # Invariants
//! - The window starts at the first keystroke of a burst and is not extended
//!   by later keystrokes.
//! - At most one commit is pending; at least one fires after any keystroke
//!   unless the adapter is cancelled.
//! - External values replace the draft only while the draft is empty.
//!
//! Time is passed in by the caller so the adapter stays single-threaded and
//! timer-free; the host polls it from its event loop.

use std::time::{Duration, Instant};

/// Default quiet period between commits.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct DebouncedInput {
    draft: String,
    window: Duration,
    deadline: Option<Instant>,
}

impl DebouncedInput {
    pub fn new(initial: impl Into<String>, window: Duration) -> Self {
        Self {
            draft: initial.into(),
            window,
            deadline: None,
        }
    }

    /// Current local draft shown by the field.
    pub fn draft(&self) -> &str {
        self.draft.as_str()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records one keystroke at `now`.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.draft = value.into();
        if self.deadline.is_none() {
            self.deadline = Some(now + self.window);
        }
    }

    /// Offers an authoritative value pushed from outside the field.
    ///
    /// Ignored while the draft has content.
    pub fn sync_external(&mut self, value: &str) {
        if self.draft.is_empty() {
            self.draft = value.to_string();
        }
    }

    /// Returns the value to commit when the pending window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.draft.clone())
            }
            _ => None,
        }
    }

    /// Deadline of the pending commit, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drops any pending commit.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
