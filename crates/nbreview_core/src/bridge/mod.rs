//! Message-passing boundary between the host and the embedded viewer.
//!
//! # Responsibility
//! - Decode inbound frame messages into typed variants without failing.
//! - Post full-document updates to the attached frame, fire-and-forget.
//!
//! # Invariants
//! - Inbound parsing is total: anything unreadable becomes `Unrecognized`.
//! - Sending without an attached frame is a silent no-op with no replay.

pub mod message;
pub mod notebook_bridge;
