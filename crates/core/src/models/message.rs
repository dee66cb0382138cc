//! Support-chat message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One support-chat message between two parties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: String,
    /// Sending user id (or "support").
    pub sender: String,
    /// Receiving user id (or "support").
    pub recipient: String,
    /// Message body.
    pub content: String,
    /// Send timestamp.
    pub timestamp: DateTime<Utc>,
    /// Whether the recipient has read the message.
    pub read: bool,
}

impl Message {
    /// Creates an unread message.
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            timestamp: Utc::now(),
            read: false,
        }
    }

    /// Returns true if `party` sent or received this message.
    #[must_use]
    pub fn involves(&self, party: &str) -> bool {
        self.sender == party || self.recipient == party
    }
}
