//! Review note codec.
//!
//! # Responsibility
//! - Find the single review note among arbitrary third-party notes.
//! - Decode its payload and upsert a patched payload back into the list.
//!
//! # Invariants
//! - A note is a review note iff its `text` is a string that parses to a JSON
//!   object whose `type` equals `REVIEW_NOTE_KIND`.
//! - Notes of any other shape are carried through untouched.
//! - `upsert` keeps list length and position when a review note exists and
//!   appends exactly one note otherwise.
//! - `notebook_url` is always rewritten from the caller's hint.

use crate::model::notebook::Note;
use crate::model::review::{ReviewPatch, ReviewPayload, REVIEW_NOTE_AUTHOR, REVIEW_NOTE_KIND};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{error, warn};
use serde_json::Value;

/// Returns the index of the first review note in `notes`.
pub fn find_review_note(notes: &[Note]) -> Option<usize> {
    notes
        .iter()
        .position(|note| note.text().is_some_and(is_review_text))
}

/// Decodes the review payload from `notes`, if one is present and readable.
pub fn decode(notes: &[Note]) -> Option<ReviewPayload> {
    let index = find_review_note(notes)?;
    let payload = notes[index].text().and_then(decode_review_text);
    if payload.is_none() {
        warn!("event=review_note_decode module=codec status=error index={index}");
    }
    payload
}

/// Applies `patch` to the review note in `notes` and returns the new list.
///
/// The payload is stamped with the current UTC time. See [`upsert_at`].
pub fn upsert(notes: &[Note], patch: &ReviewPatch, document_url: &str) -> Vec<Note> {
    upsert_at(notes, patch, document_url, Utc::now())
}

/// Applies `patch` to the review note in `notes` using `now` as timestamp.
///
/// - Existing review note: replaced at its index with the old payload
///   shallow-merged with `patch`. Other note keys are kept.
/// - No review note: a new note is appended whose payload is `patch` merged
///   over an empty review.
/// - Review note whose payload cannot be decoded: replaced at its index by a
///   fresh payload.
pub fn upsert_at(
    notes: &[Note],
    patch: &ReviewPatch,
    document_url: &str,
    now: DateTime<Utc>,
) -> Vec<Note> {
    let existing = find_review_note(notes);
    let base = match existing {
        Some(index) => notes[index]
            .text()
            .and_then(decode_review_text)
            .unwrap_or_else(|| {
                warn!(
                    "event=review_note_upsert module=codec status=recovered index={index} reason=undecodable_payload"
                );
                ReviewPayload::new(document_url)
            }),
        None => ReviewPayload::new(document_url),
    };

    let mut payload = base.merged(patch);
    payload.kind = REVIEW_NOTE_KIND.to_string();
    payload.document_url = document_url.to_string();

    let text = match serde_json::to_string(&payload) {
        Ok(text) => text,
        Err(err) => {
            error!("event=review_note_upsert module=codec status=error error={err}");
            return notes.to_vec();
        }
    };
    let timestamp = format_timestamp(now);

    let mut updated = notes.to_vec();
    match existing {
        Some(index) => {
            let note = &mut updated[index];
            note.set_text(text);
            note.set_timestamp(timestamp);
        }
        None => updated.push(Note::new(REVIEW_NOTE_AUTHOR, text, timestamp)),
    }
    updated
}

/// Formats `now` the way the viewer stamps notes: `2025-01-31T09:15:00.123Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_review_text(text: &str) -> bool {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => {
            object.get("type").and_then(Value::as_str) == Some(REVIEW_NOTE_KIND)
        }
        _ => false,
    }
}

fn decode_review_text(text: &str) -> Option<ReviewPayload> {
    if !is_review_text(text) {
        return None;
    }
    serde_json::from_str(text).ok()
}
