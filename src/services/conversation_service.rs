use deadpool_postgres::Pool;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::conversation::{
    Conversation, ConversationDetail, ConversationListItem, ParticipantEntry,
};
use crate::models::message::{preview, MessageWithSender};
use crate::services::message_service::MessageService;

pub struct ConversationService;

impl ConversationService {
    /// List a user's active conversations, most recently touched first.
    ///
    /// Returns the page plus the total count. Users with no memberships get
    /// an empty page without any further round-trips.
    pub async fn list_for_user(
        db: &Pool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ConversationListItem>, i64), AppError> {
        let client = db.get().await?;

        let participations = client
            .query(
                r#"
                SELECT conversation_id, unread_count, is_muted
                FROM conversation_participants
                WHERE user_id = $1 AND is_active
                "#,
                &[&user_id],
            )
            .await?;

        if participations.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut own_state: HashMap<Uuid, (i32, bool)> = HashMap::new();
        let mut member_of: Vec<Uuid> = Vec::with_capacity(participations.len());
        for row in &participations {
            let id: Uuid = row.get("conversation_id");
            own_state.insert(id, (row.get("unread_count"), row.get("is_muted")));
            member_of.push(id);
        }

        let conv_rows = client
            .query(
                r#"
                SELECT c.*, COUNT(*) OVER() AS total
                FROM conversations c
                WHERE c.id = ANY($1) AND c.status = 'active'
                ORDER BY c.last_message_at DESC NULLS LAST
                LIMIT $2 OFFSET $3
                "#,
                &[&member_of, &limit, &offset],
            )
            .await?;

        let total: i64 = conv_rows.first().map(|r| r.get("total")).unwrap_or(0);

        let page_ids: Vec<Uuid> = conv_rows.iter().map(|r| r.get("id")).collect();
        let mut rosters = Self::participants_by_conversation(db, &page_ids, user_id).await?;

        let items = conv_rows
            .iter()
            .map(|row| {
                let conversation = Conversation::from_row(row);
                let (unread_count, is_muted) = own_state
                    .get(&conversation.id)
                    .copied()
                    .unwrap_or((0, false));
                ConversationListItem {
                    participants: rosters.remove(&conversation.id).unwrap_or_default(),
                    unread_count,
                    is_muted,
                    conversation,
                }
            })
            .collect();

        Ok((items, total))
    }

    async fn participants_by_conversation(
        db: &Pool,
        conversation_ids: &[Uuid],
        current_user: Uuid,
    ) -> Result<HashMap<Uuid, Vec<ParticipantEntry>>, AppError> {
        if conversation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let client = db.get().await?;
        let rows = client
            .query(
                r#"
                SELECT cp.conversation_id, cp.user_id, cp.role,
                       p.full_name, p.avatar_url, p.user_type
                FROM conversation_participants cp
                LEFT JOIN profiles p ON p.id = cp.user_id
                WHERE cp.conversation_id = ANY($1)
                ORDER BY cp.joined_at ASC
                "#,
                &[&conversation_ids],
            )
            .await?;

        let mut grouped: HashMap<Uuid, Vec<ParticipantEntry>> = HashMap::new();
        for row in &rows {
            let conversation_id: Uuid = row.get("conversation_id");
            grouped
                .entry(conversation_id)
                .or_default()
                .push(ParticipantEntry::from_row(row, current_user));
        }
        Ok(grouped)
    }

    /// Conversation plus its active participant roster.
    pub async fn get_detail(
        db: &Pool,
        conversation_id: Uuid,
        current_user: Uuid,
    ) -> Result<ConversationDetail, AppError> {
        let conversation = Self::fetch(db, conversation_id).await?;

        let client = db.get().await?;
        let rows = client
            .query(
                r#"
                SELECT cp.user_id, cp.role, p.full_name, p.avatar_url, p.user_type
                FROM conversation_participants cp
                LEFT JOIN profiles p ON p.id = cp.user_id
                WHERE cp.conversation_id = $1 AND cp.is_active
                ORDER BY cp.joined_at ASC
                "#,
                &[&conversation_id],
            )
            .await?;

        let participants = rows
            .iter()
            .map(|row| ParticipantEntry::from_row(row, current_user))
            .collect();

        Ok(ConversationDetail {
            conversation,
            participants,
        })
    }

    pub async fn fetch(db: &Pool, conversation_id: Uuid) -> Result<Conversation, AppError> {
        let client = db.get().await?;
        let row = client
            .query_opt(
                "SELECT * FROM conversations WHERE id = $1",
                &[&conversation_id],
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;
        Ok(Conversation::from_row(&row))
    }

    /// Find an existing direct conversation whose participant set contains
    /// both users. This is the dedup check for `POST /conversations`; it
    /// deliberately ignores conversation status, so a pair can never
    /// accumulate a second direct row.
    pub async fn find_existing_direct(
        db: &Pool,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        let client = db.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT c.id
                FROM conversations c
                WHERE c.conversation_type = 'direct'
                  AND EXISTS (
                      SELECT 1 FROM conversation_participants
                      WHERE conversation_id = c.id AND user_id = $1
                  )
                  AND EXISTS (
                      SELECT 1 FROM conversation_participants
                      WHERE conversation_id = c.id AND user_id = $2
                  )
                LIMIT 1
                "#,
                &[&user_a, &user_b],
            )
            .await?;
        Ok(row.map(|r| r.get("id")))
    }

    /// Create a conversation with its two participants and first message in
    /// one transaction. The recipient's unread counter is pre-seeded to 1 for
    /// the message being inserted.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_with_first_message(
        db: &Pool,
        sender_id: Uuid,
        recipient_id: Uuid,
        conversation_type: &str,
        subject: Option<&str>,
        project_id: Option<Uuid>,
        job_id: Option<Uuid>,
        content: &str,
    ) -> Result<(Conversation, MessageWithSender), AppError> {
        let conversation_id = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        let message_preview = preview(content);

        let mut client = db.get().await?;
        let tx = client.transaction().await?;

        let conv_row = tx
            .query_one(
                r#"
                INSERT INTO conversations (
                    id, conversation_type, subject, project_id, job_id,
                    last_message_at, last_message_preview
                ) VALUES ($1, $2, $3, $4, $5, NOW(), $6)
                RETURNING *
                "#,
                &[
                    &conversation_id,
                    &conversation_type,
                    &subject,
                    &project_id,
                    &job_id,
                    &message_preview,
                ],
            )
            .await?;

        tx.execute(
            r#"
            INSERT INTO conversation_participants (conversation_id, user_id, unread_count)
            VALUES ($1, $2, 0), ($1, $3, 1)
            "#,
            &[&conversation_id, &sender_id, &recipient_id],
        )
        .await?;

        let attachments: Option<JsonValue> = None;
        let msg_row = tx
            .query_one(
                MessageService::INSERT_WITH_SENDER_SQL,
                &[
                    &message_id,
                    &conversation_id,
                    &sender_id,
                    &content,
                    &None::<Uuid>,
                    &attachments,
                ],
            )
            .await?;

        tx.commit().await?;

        Ok((
            Conversation::from_row(&conv_row),
            MessageWithSender::from_row(&msg_row),
        ))
    }

    /// Refresh the conversation's last-message metadata after a send.
    pub async fn touch_last_message(
        db: &Pool,
        conversation_id: Uuid,
        message_preview: &str,
    ) -> Result<(), AppError> {
        let client = db.get().await?;
        client
            .execute(
                r#"
                UPDATE conversations
                SET last_message_at = NOW(), last_message_preview = $2
                WHERE id = $1
                "#,
                &[&conversation_id, &message_preview],
            )
            .await?;
        Ok(())
    }

    /// Atomically bump the unread counter of every other active participant.
    /// Returns the affected user ids for notification fan-out. The increment
    /// is evaluated server-side, so concurrent sends never lose updates.
    pub async fn increment_unread_except(
        db: &Pool,
        conversation_id: Uuid,
        sender_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError> {
        let client = db.get().await?;
        let rows = client
            .query(
                r#"
                UPDATE conversation_participants
                SET unread_count = unread_count + 1
                WHERE conversation_id = $1 AND user_id <> $2 AND is_active
                RETURNING user_id
                "#,
                &[&conversation_id, &sender_id],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get("user_id")).collect())
    }

    /// Atomic single-recipient unread bump (dedup append path).
    pub async fn increment_unread_for(
        db: &Pool,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let client = db.get().await?;
        client
            .execute(
                r#"
                UPDATE conversation_participants
                SET unread_count = unread_count + 1
                WHERE conversation_id = $1 AND user_id = $2
                "#,
                &[&conversation_id, &user_id],
            )
            .await?;
        Ok(())
    }

    /// Zero the caller's unread counter and stamp their read time.
    pub async fn reset_unread(
        db: &Pool,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let client = db.get().await?;
        client
            .execute(
                r#"
                UPDATE conversation_participants
                SET unread_count = 0, last_read_at = NOW()
                WHERE conversation_id = $1 AND user_id = $2
                "#,
                &[&conversation_id, &user_id],
            )
            .await?;
        Ok(())
    }

    /// Update the caller's own mute flag.
    pub async fn set_muted(
        db: &Pool,
        conversation_id: Uuid,
        user_id: Uuid,
        is_muted: bool,
    ) -> Result<(), AppError> {
        let client = db.get().await?;
        client
            .execute(
                r#"
                UPDATE conversation_participants
                SET is_muted = $3
                WHERE conversation_id = $1 AND user_id = $2
                "#,
                &[&conversation_id, &user_id, &is_muted],
            )
            .await?;
        Ok(())
    }
}
