use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio_postgres::Row;
use uuid::Uuid;

/// Maximum characters carried into `last_message_preview` and notification
/// bodies.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Character-safe preview truncation (the limit is in characters, not bytes,
/// so multi-byte content is never split).
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_MAX_CHARS).collect()
}

/// Message row. Immutable once created except for the soft-delete transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub reply_to_id: Option<Uuid>,
    pub attachments: Option<JsonValue>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            conversation_id: row.get("conversation_id"),
            sender_id: row.get("sender_id"),
            content: row.get("content"),
            reply_to_id: row.get("reply_to_id"),
            attachments: row.get("attachments"),
            is_deleted: row.get("is_deleted"),
            deleted_at: row.get("deleted_at"),
            created_at: row.get("created_at"),
        }
    }
}

/// Sender's public profile joined onto message responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub sender: SenderProfile,
}

impl MessageWithSender {
    /// Build from a row that joins `messages` with the sender's profile
    /// columns (`full_name`, `avatar_url`).
    pub fn from_row(row: &Row) -> Self {
        let message = Message::from_row(row);
        let sender = SenderProfile {
            id: message.sender_id,
            full_name: row.get("full_name"),
            avatar_url: row.get("avatar_url"),
        };
        Self { message, sender }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_identity_for_short_content() {
        assert_eq!(preview("Need a UiPath dev"), "Need a UiPath dev");
    }

    #[test]
    fn preview_caps_at_100_chars() {
        let long = "x".repeat(250);
        assert_eq!(preview(&long).chars().count(), PREVIEW_MAX_CHARS);
    }

    #[test]
    fn preview_never_splits_multibyte_chars() {
        let long: String = "é".repeat(150);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS);
        assert!(p.chars().all(|c| c == 'é'));
    }
}
