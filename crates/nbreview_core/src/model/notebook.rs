//! Notebook document model.
//!
//! # Responsibility
//! - Mirror just enough of the notebook JSON to reach the first cell's notes.
//! - Keep every other key opaque and preserved.
//!
//! # Invariants
//! - Only `cells[0].metadata.nbfiddle_notes` is ever read or written.
//! - Note order is insertion order and is never re-sorted.
//! - Any JSON value is accepted as a note; foreign notes are never rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const NOTE_AUTHOR_KEY: &str = "user";
const NOTE_TEXT_KEY: &str = "text";
const NOTE_TIMESTAMP_KEY: &str = "timestamp";

/// Full notebook document as exchanged with the embedded viewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Every other top-level key (`metadata`, `nbformat`, ...).
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One notebook cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// `null` reads as empty metadata.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: CellMetadata,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Cell metadata; only the note list is typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellMetadata {
    /// `None` when the viewer never attached a note list to this cell, or
    /// attached something that is not a list.
    #[serde(
        rename = "nbfiddle_notes",
        default,
        deserialize_with = "notes_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Vec<Note>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Free-form annotation attached to a cell.
///
/// Kept as raw JSON: only the review note codec looks inside, and only at
/// string-valued `user`/`text`/`timestamp` fields. Notes written by other
/// tools round-trip untouched whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note {
    raw: Value,
}

impl Note {
    pub fn new(
        author: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert(NOTE_AUTHOR_KEY.to_string(), Value::String(author.into()));
        fields.insert(NOTE_TEXT_KEY.to_string(), Value::String(text.into()));
        fields.insert(
            NOTE_TIMESTAMP_KEY.to_string(),
            Value::String(timestamp.into()),
        );
        Self {
            raw: Value::Object(fields),
        }
    }

    /// Stored under `user` to match the viewer's note schema.
    pub fn author(&self) -> Option<&str> {
        self.str_field(NOTE_AUTHOR_KEY)
    }

    /// `None` when absent or not a string.
    pub fn text(&self) -> Option<&str> {
        self.str_field(NOTE_TEXT_KEY)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.str_field(NOTE_TIMESTAMP_KEY)
    }

    /// Raw JSON value as stored by the viewer.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_str_field(NOTE_TEXT_KEY, text.into());
    }

    pub fn set_timestamp(&mut self, timestamp: impl Into<String>) {
        self.set_str_field(NOTE_TIMESTAMP_KEY, timestamp.into());
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    fn set_str_field(&mut self, key: &str, value: String) {
        match &mut self.raw {
            Value::Object(fields) => {
                fields.insert(key.to_string(), Value::String(value));
            }
            other => {
                let mut fields = Map::new();
                fields.insert(key.to_string(), Value::String(value));
                *other = Value::Object(fields);
            }
        }
    }
}

impl From<Value> for Note {
    fn from(raw: Value) -> Self {
        Self { raw }
    }
}

impl Notebook {
    /// Returns the first cell's note list, or an empty slice when the cell or
    /// the list is absent.
    pub fn first_cell_notes(&self) -> &[Note] {
        self.cells
            .first()
            .and_then(|cell| cell.metadata.notes.as_deref())
            .unwrap_or(&[])
    }

    /// Returns a copy of this notebook with the first cell's notes replaced.
    ///
    /// Returns `None` when the notebook has no cells.
    pub fn with_first_cell_notes(&self, notes: Vec<Note>) -> Option<Self> {
        let mut updated = self.clone();
        let cell = updated.cells.first_mut()?;
        cell.metadata.notes = Some(notes);
        Some(updated)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn notes_or_none<'de, D>(deserializer: D) -> Result<Option<Vec<Note>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.into_iter().map(Note::from).collect())),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, Notebook};
    use serde_json::json;

    #[test]
    fn missing_metadata_reads_as_empty_notes() {
        let notebook: Notebook =
            serde_json::from_value(json!({ "cells": [{ "cell_type": "code" }] }))
                .expect("notebook should decode");
        assert!(notebook.first_cell_notes().is_empty());
    }

    #[test]
    fn null_metadata_and_non_list_notes_read_as_empty() {
        let notebook: Notebook = serde_json::from_value(json!({
            "cells": [{ "metadata": null }, { "metadata": { "nbfiddle_notes": "n/a" } }]
        }))
        .expect("notebook should decode");
        assert!(notebook.first_cell_notes().is_empty());
        assert!(notebook.cells[1].metadata.notes.is_none());
    }

    #[test]
    fn foreign_notes_of_any_shape_are_accepted_and_kept() {
        let notes = json!([
            { "user": "other-tool", "text": "hi", "timestamp": 1_700_000_000 },
            { "user": null, "text": { "rich": true } },
            "bare string note",
            null
        ]);
        let source = json!({ "cells": [{ "metadata": { "nbfiddle_notes": notes } }] });
        let notebook: Notebook =
            serde_json::from_value(source.clone()).expect("notebook should decode");

        let decoded = notebook.first_cell_notes();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded[0].text(), Some("hi"));
        assert_eq!(decoded[0].timestamp(), None);
        assert_eq!(decoded[1].author(), None);
        assert_eq!(decoded[1].text(), None);
        assert_eq!(
            serde_json::to_value(&notebook).expect("notebook should encode"),
            source
        );
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let source = json!({
            "cells": [{
                "cell_type": "markdown",
                "source": ["# Title"],
                "metadata": { "collapsed": true }
            }],
            "metadata": { "kernelspec": { "name": "python3" } },
            "nbformat": 4
        });
        let notebook: Notebook =
            serde_json::from_value(source.clone()).expect("notebook should decode");
        let encoded = serde_json::to_value(&notebook).expect("notebook should encode");
        assert_eq!(encoded, source);
    }

    #[test]
    fn note_author_uses_user_wire_field() {
        let note = Note::new("alice", "hello", "2025-01-01T00:00:00.000Z");
        let value = serde_json::to_value(&note).expect("note should encode");
        assert_eq!(value["user"], "alice");
        assert!(value.get("author").is_none());
        assert_eq!(note.author(), Some("alice"));
    }

    #[test]
    fn setters_keep_other_note_fields() {
        let mut note = Note::from(json!({ "user": "x", "text": "a", "id": 7 }));
        note.set_text("b");
        note.set_timestamp("t");
        assert_eq!(
            note.as_value(),
            &json!({ "user": "x", "text": "b", "id": 7, "timestamp": "t" })
        );
    }

    #[test]
    fn with_first_cell_notes_leaves_source_untouched() {
        let notebook: Notebook = serde_json::from_value(json!({ "cells": [{}] }))
            .expect("notebook should decode");
        let updated = notebook
            .with_first_cell_notes(vec![Note::new("bob", "x", "t")])
            .expect("notebook has a first cell");
        assert!(notebook.first_cell_notes().is_empty());
        assert_eq!(updated.first_cell_notes().len(), 1);
    }

    #[test]
    fn with_first_cell_notes_requires_a_cell() {
        let notebook = Notebook::default();
        assert!(notebook.with_first_cell_notes(Vec::new()).is_none());
    }
}
