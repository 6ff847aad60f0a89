//! Frame message envelope.
//!
//! Wire shape: `{ "type": <kind>, "content": <JSON string of Notebook> }`.

use crate::model::notebook::Notebook;
use serde::{Deserialize, Serialize};

/// Viewer → host: full document snapshot.
pub const SNAPSHOT_MESSAGE_TYPE: &str = "notebookContent";
/// Host → viewer: full updated document.
pub const UPDATE_MESSAGE_TYPE: &str = "updateNotebook";

/// Decoded frame message.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    Snapshot(Notebook),
    Update(Notebook),
    /// Anything else; `reason` is a short diagnostic for logs.
    Unrecognized { reason: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    content: String,
}

impl BridgeMessage {
    /// Parses a raw message; never fails.
    pub fn parse(raw: &str) -> Self {
        let envelope: Envelope = match serde_json::from_str(raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                return Self::Unrecognized {
                    reason: format!("invalid envelope: {err}"),
                }
            }
        };

        let wrap: fn(Notebook) -> Self = match envelope.kind.as_str() {
            SNAPSHOT_MESSAGE_TYPE => Self::Snapshot,
            UPDATE_MESSAGE_TYPE => Self::Update,
            other => {
                return Self::Unrecognized {
                    reason: format!("unknown message type `{other}`"),
                }
            }
        };

        match serde_json::from_str::<Notebook>(envelope.content.as_str()) {
            Ok(notebook) => wrap(notebook),
            Err(err) => Self::Unrecognized {
                reason: format!("invalid `{}` content: {err}", envelope.kind),
            },
        }
    }

    /// Encodes an outbound update for `notebook`.
    pub fn encode_update(notebook: &Notebook) -> Result<String, serde_json::Error> {
        let envelope = Envelope {
            kind: UPDATE_MESSAGE_TYPE.to_string(),
            content: serde_json::to_string(notebook)?,
        };
        serde_json::to_string(&envelope)
    }
}
