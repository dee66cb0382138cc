//! Notification records.
//!
//! Read state is tracked per recipient in `read_by`; a broadcast carries one
//! marker per user that has seen it rather than a single shared flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Broadcast to every user.
    General,
    /// Addressed to a single recipient by an admin.
    Personal,
    /// Emitted by the platform itself (e.g. the registration welcome).
    System,
}

impl NotificationKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Personal => "personal",
            Self::System => "system",
        }
    }
}

/// An informational record shown in the notification panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier.
    pub id: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Audience kind.
    pub kind: NotificationKind,
    /// Recipient, present for Personal and System notifications only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Ids of users that have read this notification.
    #[serde(default)]
    pub read_by: Vec<String>,
}

impl Notification {
    fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        recipient_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            kind,
            recipient_id,
            created_at: Utc::now(),
            read_by: Vec::new(),
        }
    }

    /// Creates a broadcast notification.
    #[must_use]
    pub fn general(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationKind::General, None)
    }

    /// Creates a notification addressed to one user.
    #[must_use]
    pub fn personal(
        title: impl Into<String>,
        message: impl Into<String>,
        recipient_id: impl Into<String>,
    ) -> Self {
        Self::new(
            title,
            message,
            NotificationKind::Personal,
            Some(recipient_id.into()),
        )
    }

    /// Creates a platform-emitted notification for one user.
    #[must_use]
    pub fn system(
        title: impl Into<String>,
        message: impl Into<String>,
        recipient_id: impl Into<String>,
    ) -> Self {
        Self::new(
            title,
            message,
            NotificationKind::System,
            Some(recipient_id.into()),
        )
    }

    /// Returns true if `user_id` should see this notification.
    #[must_use]
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        match self.kind {
            NotificationKind::General => true,
            NotificationKind::Personal | NotificationKind::System => {
                self.recipient_id.as_deref() == Some(user_id)
            }
        }
    }

    /// Returns true if `user_id` has read this notification.
    #[must_use]
    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.iter().any(|id| id == user_id)
    }

    /// Records that `user_id` has read this notification.
    ///
    /// Returns true if the marker was newly added; marking twice is a no-op.
    pub fn mark_read_by(&mut self, user_id: &str) -> bool {
        if self.is_read_by(user_id) {
            false
        } else {
            self.read_by.push(user_id.to_string());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_visible_to_everyone() {
        let n = Notification::general("Maintenance", "Scheduled downtime tonight");
        assert!(n.is_visible_to("user-1"));
        assert!(n.is_visible_to("user-2"));
    }

    #[test]
    fn test_personal_visible_to_recipient_only() {
        let n = Notification::personal("Verified", "Your account is verified", "user-1");
        assert!(n.is_visible_to("user-1"));
        assert!(!n.is_visible_to("user-2"));
    }

    #[test]
    fn test_read_markers_are_per_user() {
        let mut n = Notification::general("Hello", "World");
        assert!(n.mark_read_by("user-1"));

        assert!(n.is_read_by("user-1"));
        assert!(!n.is_read_by("user-2"));
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        let mut n = Notification::general("Hello", "World");
        assert!(n.mark_read_by("user-1"));
        assert!(!n.mark_read_by("user-1"));
        assert_eq!(n.read_by.len(), 1);
    }

    #[test]
    fn test_read_by_defaults_on_deserialize() {
        // Records written before the per-recipient marker existed.
        let json = r#"{
            "id": "n1",
            "title": "Old",
            "message": "record",
            "kind": "General",
            "created_at": "2025-01-31T12:00:00Z"
        }"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert!(n.read_by.is_empty());
    }
}
