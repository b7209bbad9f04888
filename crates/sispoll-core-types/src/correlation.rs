//! Correlation identifiers
//!
//! Every invocation of the poller gets a [`RunId`] that is attached to its
//! log lines, and every outbound notification carries a [`MessageId`] the
//! gateway can use for de-duplication.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one scheduled invocation of the poller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a fresh, time-ordered RunId (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a notification is about; decides the message identifier prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// A change report produced by a poll run
    Update,
    /// A canned message used to check the notification channel
    Test,
}

impl MessageKind {
    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Update => "sisUpdateMessage",
            MessageKind::Test => "sisTestMessage",
        }
    }
}

/// Unique identifier attached to an outbound notification
///
/// Rendered as `<prefix>_<uuid>`, e.g. `sisUpdateMessage_0190...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(kind: MessageKind) -> Self {
        Self(format!("{}_{}", kind.prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
