//! FFI use-case API for the host UI.
//!
//! # Responsibility
//! - Expose one process-wide review controller to the host via FRB.
//! - Turn frame traffic into plain strings: the host forwards inbound
//!   viewer messages in and drains outbound updates to post to the frame.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - At most one review is open per process; `review_open` replaces it.
//! - Outbound messages are queued only while the frame is attached.

use log::{info, warn};
use nbreview_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_catalog,
    Answers, FrameTarget, LaunchParams, Question, ReviewConfig, ReviewController, SessionError,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

static REVIEW: Mutex<Option<OpenReview>> = Mutex::new(None);

/// Frame target that queues messages for the host to post.
#[derive(Clone, Default)]
struct OutboxFrame {
    queue: Arc<Mutex<Vec<String>>>,
}

impl FrameTarget for OutboxFrame {
    fn post_message(&self, message: &str) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

impl OutboxFrame {
    fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

struct OpenReview {
    controller: ReviewController<OutboxFrame>,
    outbox: OutboxFrame,
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Response for opening a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOpenResponse {
    pub ok: bool,
    /// Address to load into the embedded viewer frame.
    pub viewer_url: Option<String>,
    /// Human-readable message; shown by the host when `ok` is false.
    pub message: String,
}

/// Response for one answer edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewActionResponse {
    pub ok: bool,
    /// Whether an update was queued for the frame.
    pub sent: bool,
    pub message: String,
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAnswerItem {
    pub question_id: String,
    pub value: i64,
}

/// Form state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewStateView {
    /// False until the first snapshot; the host keeps inputs disabled.
    pub loaded: bool,
    /// Text to show in the reviewer-name field.
    pub reviewer_name_draft: String,
    pub answers: Vec<ReviewAnswerItem>,
}

/// One selectable score of a catalog question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuestionOptionItem {
    pub value: i64,
    pub label: String,
}

/// One catalog question joined with the current answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuestionItem {
    pub id: String,
    pub text: String,
    pub options: Vec<ReviewQuestionOptionItem>,
    /// Current score, if answered in the open review.
    pub selected_value: Option<i64>,
    /// Label of `selected_value`; `None` when the score is not in the catalog.
    pub selected_label: Option<String>,
}

/// Response for loading the question catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuestionsResponse {
    pub ok: bool,
    pub items: Vec<ReviewQuestionItem>,
    pub message: String,
}

/// Parses the host's question catalog and joins it with current answers.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Works without an open review (no question is selected then).
/// - Never panics; invalid catalogs return `ok=false` with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn review_questions(catalog_json: String) -> ReviewQuestionsResponse {
    let questions = match parse_catalog(catalog_json.as_str()) {
        Ok(questions) => questions,
        Err(err) => {
            warn!("event=review_questions module=ffi status=error error={err}");
            return ReviewQuestionsResponse {
                ok: false,
                items: Vec::new(),
                message: err.to_string(),
            };
        }
    };
    let answers = with_review(|review| review.controller.session().answers().clone())
        .unwrap_or_default();
    let items = questions
        .iter()
        .map(|question| to_question_item(question, &answers))
        .collect::<Vec<_>>();
    ReviewQuestionsResponse {
        ok: true,
        message: format!("Loaded {} question(s).", items.len()),
        items,
    }
}

/// Opens a review from the host page's raw query string.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Reads `NBREVIEW_*` configuration from the environment.
/// - Replaces any previously open review.
#[flutter_rust_bridge::frb(sync)]
pub fn review_open(query: String) -> ReviewOpenResponse {
    let config = match ReviewConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!("event=review_open module=ffi status=error error={err}");
            return ReviewOpenResponse {
                ok: false,
                viewer_url: None,
                message: err.to_string(),
            };
        }
    };
    let params = match LaunchParams::from_query(query.as_str()) {
        Ok(params) => params,
        Err(err) => {
            return ReviewOpenResponse {
                ok: false,
                viewer_url: None,
                message: err.to_string(),
            };
        }
    };

    let viewer_url = params.viewer_url(config.viewer_base_url.as_str());
    let review = OpenReview {
        controller: ReviewController::from_launch(&params, &config),
        outbox: OutboxFrame::default(),
    };
    if let Some(mut previous) = lock_review().replace(review) {
        previous.controller.teardown();
    }
    info!("event=review_open module=ffi status=ok viewer_url={viewer_url}");
    ReviewOpenResponse {
        ok: true,
        viewer_url: Some(viewer_url),
        message: "Loading notebook".to_string(),
    }
}

/// Marks the viewer frame as ready to receive messages.
#[flutter_rust_bridge::frb(sync)]
pub fn review_frame_attached() -> bool {
    with_review(|review| {
        let frame = review.outbox.clone();
        review.controller.attach_frame(frame);
    })
    .is_some()
}

/// Marks the viewer frame as gone; later updates are dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn review_frame_detached() -> bool {
    with_review(|review| review.controller.detach_frame().is_some()).unwrap_or(false)
}

/// Forwards one raw message received from the viewer frame.
///
/// Returns whether it carried a snapshot that was applied.
#[flutter_rust_bridge::frb(sync)]
pub fn review_handle_message(raw: String) -> bool {
    with_review(|review| review.controller.handle_message(raw.as_str())).unwrap_or(false)
}

/// Records one answer.
#[flutter_rust_bridge::frb(sync)]
pub fn review_set_answer(question_id: String, value: i64) -> ReviewActionResponse {
    let result = with_review(|review| review.controller.set_answer(question_id.as_str(), value));
    match result {
        Some(Ok(sent)) => ReviewActionResponse {
            ok: true,
            sent,
            message: String::new(),
        },
        Some(Err(err)) => ReviewActionResponse {
            ok: false,
            sent: false,
            message: err.to_string(),
        },
        None => ReviewActionResponse {
            ok: false,
            sent: false,
            message: SessionError::NotLoaded.to_string(),
        },
    }
}

/// Records one keystroke in the reviewer-name field.
///
/// Returns the draft to display.
#[flutter_rust_bridge::frb(sync)]
pub fn review_input_reviewer_name(text: String) -> String {
    with_review(|review| {
        review.controller.input_reviewer_name(text, Instant::now());
        review.controller.reviewer_name_draft().to_string()
    })
    .unwrap_or_default()
}

/// Commits a due reviewer-name edit; call from a host timer.
///
/// Returns the milliseconds until the next pending commit, or `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn review_poll() -> Option<u64> {
    with_review(|review| {
        let now = Instant::now();
        review.controller.poll(now);
        review
            .controller
            .next_deadline()
            .map(|deadline| {
                let millis = deadline.saturating_duration_since(now).as_millis();
                u64::try_from(millis).unwrap_or(u64::MAX)
            })
    })
    .flatten()
}

/// Returns and clears messages the host must post to the viewer frame.
#[flutter_rust_bridge::frb(sync)]
pub fn review_drain_outbox() -> Vec<String> {
    with_review(|review| review.outbox.drain()).unwrap_or_default()
}

/// Returns the form state to render.
#[flutter_rust_bridge::frb(sync)]
pub fn review_state() -> ReviewStateView {
    with_review(|review| {
        let session = review.controller.session();
        ReviewStateView {
            loaded: session.is_loaded(),
            reviewer_name_draft: review.controller.reviewer_name_draft().to_string(),
            answers: session
                .answers()
                .iter()
                .map(|(question_id, value)| ReviewAnswerItem {
                    question_id: question_id.clone(),
                    value: *value,
                })
                .collect(),
        }
    })
    .unwrap_or_default()
}

/// Closes the open review and drops pending work.
#[flutter_rust_bridge::frb(sync)]
pub fn review_close() -> bool {
    match lock_review().take() {
        Some(mut review) => {
            review.controller.teardown();
            true
        }
        None => false,
    }
}

fn to_question_item(question: &Question, answers: &Answers) -> ReviewQuestionItem {
    let selected_value = answers.get(question.id.as_str()).copied();
    ReviewQuestionItem {
        id: question.id.clone(),
        text: question.text.clone(),
        options: question
            .options
            .iter()
            .map(|option| ReviewQuestionOptionItem {
                value: option.value,
                label: option.label.clone(),
            })
            .collect(),
        selected_value,
        selected_label: selected_value
            .and_then(|value| question.option_label(value))
            .map(str::to_string),
    }
}

fn lock_review() -> std::sync::MutexGuard<'static, Option<OpenReview>> {
    REVIEW.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_review<R>(f: impl FnOnce(&mut OpenReview) -> R) -> Option<R> {
    lock_review().as_mut().map(f)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, review_close, review_drain_outbox, review_frame_attached,
        review_frame_detached, review_handle_message, review_input_reviewer_name, review_open,
        review_poll, review_questions, review_set_answer, review_state,
    };
    use nbreview_core::{decode, BridgeMessage};
    use serde_json::json;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/nbreview-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "logs".to_string());
        assert!(!error.is_empty());
    }

    // Single test: the open review is process-global.
    #[test]
    fn review_lifecycle_over_ffi() {
        let missing = review_open("?theme=dark".to_string());
        assert!(!missing.ok);
        assert!(missing.message.contains("notebook URL"));

        let opened = review_open("?notebook_url=https://x/nb.ipynb".to_string());
        assert!(opened.ok, "{}", opened.message);
        assert!(opened
            .viewer_url
            .as_deref()
            .is_some_and(|url| url.ends_with("?url=https://x/nb.ipynb&embedded=1")));
        assert!(!review_state().loaded);

        let early = review_set_answer("describe-dandiset".to_string(), 2);
        assert!(!early.ok);

        assert!(review_frame_attached());
        let snapshot = json!({
            "type": "notebookContent",
            "content": json!({ "cells": [{ "metadata": {} }] }).to_string()
        })
        .to_string();
        assert!(review_handle_message(snapshot));
        assert!(review_state().loaded);

        let edited = review_set_answer("describe-dandiset".to_string(), 2);
        assert!(edited.ok && edited.sent, "{}", edited.message);

        let outbox = review_drain_outbox();
        assert_eq!(outbox.len(), 1);
        match BridgeMessage::parse(&outbox[0]) {
            BridgeMessage::Update(notebook) => {
                let payload = decode(notebook.first_cell_notes()).expect("review payload");
                assert_eq!(payload.answers.get("describe-dandiset"), Some(&2));
                assert_eq!(payload.document_url, "https://x/nb.ipynb");
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert!(review_drain_outbox().is_empty());

        assert_eq!(review_input_reviewer_name("Ada".to_string()), "Ada");
        assert!(review_poll().is_some());

        let catalog = json!([
            {
                "id": "describe-dandiset",
                "text": "How well does the notebook describe the Dandiset?",
                "options": [
                    { "value": 0, "label": "Not at all or very poorly" },
                    { "value": 2, "label": "Very well" }
                ]
            },
            { "id": "load-nwb", "text": "Loads NWB?", "options": [] }
        ])
        .to_string();
        let questions = review_questions(catalog);
        assert!(questions.ok, "{}", questions.message);
        assert_eq!(questions.items.len(), 2);
        assert_eq!(questions.items[0].selected_value, Some(2));
        assert_eq!(questions.items[0].selected_label.as_deref(), Some("Very well"));
        assert_eq!(questions.items[1].selected_value, None);
        assert!(!review_questions("{".to_string()).ok);

        assert!(review_frame_detached());
        let dropped = review_set_answer("load-nwb".to_string(), 1);
        assert!(!dropped.ok && !dropped.sent);
        assert!(review_drain_outbox().is_empty());

        let state = review_state();
        assert_eq!(state.answers.len(), 1);
        assert_eq!(state.reviewer_name_draft, "Ada");

        assert!(review_close());
        assert!(!review_close());
        assert!(!review_state().loaded);
    }
}
