//! Notebook bridge over an attachable frame target.

use crate::bridge::message::BridgeMessage;
use crate::model::notebook::Notebook;
use log::{debug, error, warn};

/// Destination that can receive serialized frame messages.
///
/// Implemented by the host for the embedded viewer's content window.
pub trait FrameTarget {
    fn post_message(&self, message: &str);
}

/// Bridge between the review session and the embedded viewer.
pub struct NotebookBridge<T: FrameTarget> {
    target: Option<T>,
}

impl<T: FrameTarget> Default for NotebookBridge<T> {
    fn default() -> Self {
        Self { target: None }
    }
}

impl<T: FrameTarget> NotebookBridge<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the frame target. Earlier sends are not replayed.
    pub fn attach(&mut self, target: T) {
        self.target = Some(target);
    }

    /// Detaches and returns the current target.
    pub fn detach(&mut self) -> Option<T> {
        self.target.take()
    }

    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Decodes one inbound message and returns the snapshot it carries.
    ///
    /// Anything other than a valid snapshot is logged and dropped.
    pub fn receive(&self, raw: &str) -> Option<Notebook> {
        match BridgeMessage::parse(raw) {
            BridgeMessage::Snapshot(notebook) => Some(notebook),
            BridgeMessage::Update(_) => {
                debug!("event=bridge_receive module=bridge status=skipped reason=echoed_update");
                None
            }
            BridgeMessage::Unrecognized { reason } => {
                warn!("event=bridge_receive module=bridge status=dropped reason={reason}");
                None
            }
        }
    }

    /// Posts `notebook` as an update message.
    ///
    /// Returns whether a message was handed to the frame. A detached bridge
    /// drops the update silently.
    pub fn send(&self, notebook: &Notebook) -> bool {
        let Some(target) = self.target.as_ref() else {
            debug!("event=bridge_send module=bridge status=skipped reason=frame_detached");
            return false;
        };
        match BridgeMessage::encode_update(notebook) {
            Ok(message) => {
                target.post_message(message.as_str());
                true
            }
            Err(err) => {
                error!("event=bridge_send module=bridge status=error error={err}");
                false
            }
        }
    }
}
