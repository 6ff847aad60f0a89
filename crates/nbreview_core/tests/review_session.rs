use nbreview_core::{
    decode, BridgeMessage, FrameTarget, LaunchParams, Notebook, ReviewConfig, ReviewController,
    SessionError, SessionState,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct RecordingFrame {
    posted: Rc<RefCell<Vec<String>>>,
}

impl FrameTarget for RecordingFrame {
    fn post_message(&self, message: &str) {
        self.posted.borrow_mut().push(message.to_string());
    }
}

impl RecordingFrame {
    fn updates(&self) -> Vec<Notebook> {
        self.posted
            .borrow()
            .iter()
            .map(|raw| match BridgeMessage::parse(raw) {
                BridgeMessage::Update(notebook) => notebook,
                other => panic!("expected update message, got {other:?}"),
            })
            .collect()
    }
}

fn snapshot_message(notebook: serde_json::Value) -> String {
    json!({ "type": "notebookContent", "content": notebook.to_string() }).to_string()
}

fn controller(frame: &RecordingFrame) -> ReviewController<RecordingFrame> {
    let params = LaunchParams::from_query("?notebook_url=https://x/001.ipynb").expect("launch");
    let mut controller = ReviewController::from_launch(&params, &ReviewConfig::default());
    controller.attach_frame(frame.clone());
    controller
}

fn reviewed_notebook() -> serde_json::Value {
    json!({
        "cells": [{
            "cell_type": "markdown",
            "source": ["# Dandiset 000123"],
            "metadata": { "nbfiddle_notes": [
                { "user": "alice", "text": "nice intro", "timestamp": "2025-01-01T00:00:00.000Z" },
                {
                    "user": "dandi-ai-notebook-review",
                    "text": json!({
                        "type": "dandi-ai-notebook-review",
                        "notebook_url": "https://x/001.ipynb",
                        "reviewer_name": "Grace",
                        "answers": { "describe-dandiset": 2 }
                    }).to_string(),
                    "timestamp": "2025-01-01T00:00:00.000Z"
                }
            ] }
        }],
        "metadata": { "kernelspec": { "name": "python3" } },
        "nbformat": 4,
        "nbformat_minor": 5
    })
}

#[test]
fn snapshot_then_answer_sends_merged_answers() {
    let frame = RecordingFrame::default();
    let mut controller = controller(&frame);

    assert!(controller.handle_message(&snapshot_message(reviewed_notebook())));
    assert_eq!(controller.session().state(), SessionState::Loaded);
    assert_eq!(controller.reviewer_name_draft(), "Grace");

    assert_eq!(controller.set_answer("load-nwb", 1), Ok(true));

    let updates = frame.updates();
    assert_eq!(updates.len(), 1);
    let notes = updates[0].first_cell_notes();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].text(), Some("nice intro"));

    let payload = decode(notes).expect("review payload");
    assert_eq!(payload.answers.get("describe-dandiset"), Some(&2));
    assert_eq!(payload.answers.get("load-nwb"), Some(&1));
    assert_eq!(payload.answers.len(), 2);
    assert_eq!(payload.reviewer_name, "Grace");
    assert_eq!(payload.document_url, "https://x/001.ipynb");
    assert_eq!(updates[0].rest.get("nbformat"), Some(&json!(4)));
}

#[test]
fn malformed_snapshot_keeps_previous_state() {
    let frame = RecordingFrame::default();
    let mut controller = controller(&frame);
    assert!(controller.handle_message(&snapshot_message(reviewed_notebook())));

    assert!(!controller.handle_message(r#"{"type":"notebookContent","content":"{oops"}"#));
    assert!(!controller.handle_message("garbage"));
    assert_eq!(controller.session().answers().get("describe-dandiset"), Some(&2));
}

#[test]
fn answer_without_frame_is_discarded_and_not_replayed() {
    let frame = RecordingFrame::default();
    let mut controller = controller(&frame);
    controller.handle_message(&snapshot_message(reviewed_notebook()));
    controller.detach_frame();

    assert_eq!(
        controller.set_answer("load-nwb", 0),
        Err(SessionError::FrameDetached)
    );
    assert_eq!(controller.session().answers().get("load-nwb"), None);
    controller.attach_frame(frame.clone());
    assert!(frame.posted.borrow().is_empty());

    assert_eq!(controller.set_answer("plot-quality", 2), Ok(true));
    let updates = frame.updates();
    assert_eq!(updates.len(), 1);
    let payload = decode(updates[0].first_cell_notes()).expect("review payload");
    assert_eq!(payload.answers.get("load-nwb"), None);
    assert_eq!(payload.answers.get("plot-quality"), Some(&2));
    assert_eq!(payload.answers.get("describe-dandiset"), Some(&2));
}

#[test]
fn snapshot_with_foreign_notes_of_any_shape_loads_review() {
    let frame = RecordingFrame::default();
    let mut controller = controller(&frame);
    let review_text = json!({
        "type": "dandi-ai-notebook-review",
        "reviewer_name": "Grace",
        "answers": { "a": 1 }
    })
    .to_string();
    let foreign = json!({ "user": "other-tool", "text": "hi", "timestamp": 1_700_000_000 });
    let anonymous = json!({ "user": null, "text": "anonymous", "timestamp": null });
    let notebook = json!({
        "cells": [
            { "metadata": { "nbfiddle_notes": [
                foreign.clone(),
                anonymous.clone(),
                { "user": "dandi-ai-notebook-review", "text": review_text, "timestamp": "t" }
            ] } },
            { "metadata": null }
        ]
    });

    assert!(controller.handle_message(&snapshot_message(notebook)));
    assert_eq!(controller.session().answers().get("a"), Some(&1));
    assert_eq!(controller.session().reviewer_name(), "Grace");

    assert_eq!(controller.set_answer("b", 2), Ok(true));
    let updates = frame.updates();
    let notes = updates[0].first_cell_notes();
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[0].as_value(), &foreign);
    assert_eq!(notes[1].as_value(), &anonymous);
    let payload = decode(notes).expect("review payload");
    assert_eq!(payload.answers.len(), 2);
}

#[test]
fn snapshot_with_null_first_cell_metadata_still_loads() {
    let frame = RecordingFrame::default();
    let mut controller = controller(&frame);

    assert!(controller.handle_message(&snapshot_message(json!({
        "cells": [{ "cell_type": "code", "metadata": null }]
    }))));
    assert_eq!(controller.set_answer("load-nwb", 1), Ok(true));

    let updates = frame.updates();
    let payload = decode(updates[0].first_cell_notes()).expect("review payload");
    assert_eq!(payload.answers.get("load-nwb"), Some(&1));
}

#[test]
fn name_typed_before_load_is_carried_by_next_edit() {
    let frame = RecordingFrame::default();
    let mut controller = controller(&frame);
    let start = Instant::now();

    controller.input_reviewer_name("Ada", start);
    assert!(controller.poll(start + Duration::from_millis(1000)));
    assert!(frame.posted.borrow().is_empty());

    controller.handle_message(&snapshot_message(json!({ "cells": [{}] })));
    assert_eq!(controller.reviewer_name_draft(), "Ada");
    controller.set_answer("describe-dandiset", 1).expect("edit applies");

    let updates = frame.updates();
    let payload = decode(updates[0].first_cell_notes()).expect("review payload");
    assert_eq!(payload.reviewer_name, "Ada");
}

#[test]
fn stale_snapshot_resets_answers_until_the_edit_is_repeated() {
    let frame = RecordingFrame::default();
    let mut controller = controller(&frame);
    controller.handle_message(&snapshot_message(reviewed_notebook()));
    controller.set_answer("load-nwb", 1).expect("edit applies");

    // Echo of the pre-edit document arrives late.
    controller.handle_message(&snapshot_message(reviewed_notebook()));
    assert_eq!(controller.session().answers().get("load-nwb"), None);

    controller.set_answer("load-nwb", 1).expect("edit applies");
    let updates = frame.updates();
    let last = updates.last().expect("update sent");
    let payload = decode(last.first_cell_notes()).expect("review payload");
    assert_eq!(payload.answers.get("load-nwb"), Some(&1));
}
