//! Review controller: the effectful shell around a review session.
//!
//! # Responsibility
//! - Route inbound frame messages into the session.
//! - Route answer edits and debounced name edits into the session and send
//!   the resulting document through the bridge.
//!
//! # Invariants
//! - Errors are logged and swallowed here; nothing reaches the end user.
//! - Edits made while the frame is detached leave the document untouched
//!   and are never queued for a later attach.

use crate::bridge::notebook_bridge::{FrameTarget, NotebookBridge};
use crate::config::ReviewConfig;
use crate::debounce::DebouncedInput;
use crate::launch::LaunchParams;
use crate::session::{ReviewSession, SessionError};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

pub struct ReviewController<T: FrameTarget> {
    session: ReviewSession,
    bridge: NotebookBridge<T>,
    name_input: DebouncedInput,
}

impl<T: FrameTarget> ReviewController<T> {
    pub fn new(document_url: impl Into<String>, debounce: Duration) -> Self {
        let session = ReviewSession::new(document_url);
        info!(
            "event=session_open module=controller status=ok session_id={} document_url={}",
            session.session_id(),
            session.document_url()
        );
        Self {
            session,
            bridge: NotebookBridge::new(),
            name_input: DebouncedInput::new("", debounce),
        }
    }

    pub fn from_launch(params: &LaunchParams, config: &ReviewConfig) -> Self {
        Self::new(params.notebook_url(), config.debounce)
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn bridge(&self) -> &NotebookBridge<T> {
        &self.bridge
    }

    /// Text currently shown in the reviewer-name field.
    pub fn reviewer_name_draft(&self) -> &str {
        self.name_input.draft()
    }

    pub fn attach_frame(&mut self, target: T) {
        self.bridge.attach(target);
        debug!(
            "event=frame_attach module=controller status=ok session_id={}",
            self.session.session_id()
        );
    }

    pub fn detach_frame(&mut self) -> Option<T> {
        self.bridge.detach()
    }

    /// Applies one raw inbound message. Returns whether a snapshot was applied.
    pub fn handle_message(&mut self, raw: &str) -> bool {
        let Some(document) = self.bridge.receive(raw) else {
            return false;
        };
        self.session.on_snapshot(document);
        self.name_input.sync_external(self.session.reviewer_name());
        debug!(
            "event=snapshot_applied module=controller status=ok session_id={} answers={}",
            self.session.session_id(),
            self.session.answers().len()
        );
        true
    }

    /// Records one answer and sends the updated document.
    ///
    /// Without an attached frame the edit is discarded and session state is
    /// left as it was. Returns whether an update was handed to the frame.
    pub fn set_answer(&mut self, question_id: &str, value: i64) -> Result<bool, SessionError> {
        if !self.bridge.is_attached() {
            let err = SessionError::FrameDetached;
            self.log_edit_error("answer_changed", &err, true);
            return Err(err);
        }
        match self.session.on_answer_changed(question_id, value) {
            Ok(document) => Ok(self.bridge.send(&document)),
            Err(err) => {
                self.log_edit_error("answer_changed", &err, true);
                Err(err)
            }
        }
    }

    /// Records one keystroke in the reviewer-name field.
    pub fn input_reviewer_name(&mut self, text: impl Into<String>, now: Instant) {
        self.name_input.input(text, now);
    }

    /// Commits the reviewer name if its debounce window elapsed by `now`.
    ///
    /// Returns whether a commit happened.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(name) = self.name_input.poll(now) else {
            return false;
        };
        // Failures are logged by `commit_reviewer_name`.
        self.commit_reviewer_name(name).ok();
        true
    }

    /// Stores `name` and sends the updated document when one is loaded and
    /// the frame is attached.
    ///
    /// The name is always kept locally so the next delivered edit carries it.
    pub fn commit_reviewer_name(&mut self, name: impl Into<String>) -> Result<bool, SessionError> {
        if !self.bridge.is_attached() {
            self.session.set_reviewer_name(name);
            let err = SessionError::FrameDetached;
            self.log_edit_error("reviewer_name_changed", &err, false);
            return Err(err);
        }
        match self.session.on_reviewer_name_changed(name) {
            Ok(document) => Ok(self.bridge.send(&document)),
            Err(err) => {
                self.log_edit_error("reviewer_name_changed", &err, false);
                Err(err)
            }
        }
    }

    /// Deadline of the pending name commit, for host timer scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.name_input.next_deadline()
    }

    /// Drops pending work before the host discards this controller.
    pub fn teardown(&mut self) {
        self.name_input.cancel();
        self.bridge.detach();
        info!(
            "event=session_close module=controller status=ok session_id={}",
            self.session.session_id()
        );
    }

    fn log_edit_error(&self, event: &str, err: &SessionError, contract_violation: bool) {
        let session_id = self.session.session_id();
        match err {
            SessionError::EmptyDocument => warn!(
                "event={event} module=controller status=dropped session_id={session_id} error={err}"
            ),
            _ if contract_violation => error!(
                "event={event} module=controller status=error session_id={session_id} error={err}"
            ),
            _ => debug!(
                "event={event} module=controller status=deferred session_id={session_id} error={err}"
            ),
        }
    }
}
