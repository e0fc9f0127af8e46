use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Conversation row as stored. Conversations are never hard-deleted; only
/// `status` changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub conversation_type: String,
    pub subject: Option<String>,
    pub project_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_preview: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            conversation_type: row.get("conversation_type"),
            subject: row.get("subject"),
            project_id: row.get("project_id"),
            job_id: row.get("job_id"),
            last_message_at: row.get("last_message_at"),
            last_message_preview: row.get("last_message_preview"),
            status: row.get("status"),
            created_at: row.get("created_at"),
        }
    }
}

/// Public profile projection attached to participant entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub user_type: Option<String>,
}

/// One participant of a conversation, as returned to clients. The caller's
/// own entry carries `is_current_user = true`.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantEntry {
    pub user_id: Uuid,
    pub role: String,
    pub is_current_user: bool,
    pub user: ParticipantProfile,
}

impl ParticipantEntry {
    pub fn from_row(row: &Row, current_user: Uuid) -> Self {
        let user_id: Uuid = row.get("user_id");
        Self {
            user_id,
            role: row.get("role"),
            is_current_user: user_id == current_user,
            user: ParticipantProfile {
                id: user_id,
                full_name: row.get("full_name"),
                avatar_url: row.get("avatar_url"),
                user_type: row.get("user_type"),
            },
        }
    }
}

/// Conversation list item: the conversation itself plus the caller's own
/// unread/mute state and the participant roster.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationListItem {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub participants: Vec<ParticipantEntry>,
    pub unread_count: i32,
    pub is_muted: bool,
}

/// Conversation detail: conversation plus its active participant roster.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub participants: Vec<ParticipantEntry>,
}
