//! Messages posted to the worker by a page.

use serde_json::Value;

use crate::maintenance::SweepReport;

/// A message the worker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    /// `{"type": "CLEAN_CACHE"}`: run the expiry sweep now.
    CleanCache,
}

impl WorkerMessage {
    /// Recognizes a message by its `type` field.
    ///
    /// Returns `None` for anything else, including payloads that are not
    /// objects. Extra fields are ignored.
    pub fn parse(payload: &Value) -> Option<Self> {
        match payload.get("type").and_then(Value::as_str) {
            Some("CLEAN_CACHE") => Some(WorkerMessage::CleanCache),
            _ => None,
        }
    }
}

/// What the worker did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Not a message the worker understands.
    Ignored,
    /// The expiry sweep ran.
    Swept(SweepReport),
    /// The expiry sweep failed. The error has been logged.
    SweepFailed,
}
