use deadpool_postgres::Pool;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::message::MessageWithSender;

pub struct MessageService;

impl MessageService {
    /// Insert a message and join the sender's public profile in one
    /// round-trip. Parameters: id, conversation_id, sender_id, content,
    /// reply_to_id, attachments.
    pub const INSERT_WITH_SENDER_SQL: &'static str = r#"
        WITH inserted AS (
            INSERT INTO messages (id, conversation_id, sender_id, content, reply_to_id, attachments)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
        )
        SELECT i.id, i.conversation_id, i.sender_id, i.content, i.reply_to_id,
               i.attachments, i.is_deleted, i.deleted_at, i.created_at,
               p.full_name, p.avatar_url
        FROM inserted i
        LEFT JOIN profiles p ON p.id = i.sender_id
    "#;

    pub async fn insert(
        db: &Pool,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
        reply_to_id: Option<Uuid>,
        attachments: Option<JsonValue>,
    ) -> Result<MessageWithSender, AppError> {
        let id = Uuid::new_v4();
        let client = db.get().await?;
        let row = client
            .query_one(
                Self::INSERT_WITH_SENDER_SQL,
                &[
                    &id,
                    &conversation_id,
                    &sender_id,
                    &content,
                    &reply_to_id,
                    &attachments,
                ],
            )
            .await?;
        Ok(MessageWithSender::from_row(&row))
    }

    /// One page of a conversation's messages, excluding soft-deleted rows.
    ///
    /// Pagination walks newest-first (page 1 holds the latest messages), but
    /// the returned page is reversed to oldest-first for display.
    pub async fn list_page(
        db: &Pool,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MessageWithSender>, i64), AppError> {
        let client = db.get().await?;
        let rows = client
            .query(
                r#"
                SELECT m.id, m.conversation_id, m.sender_id, m.content, m.reply_to_id,
                       m.attachments, m.is_deleted, m.deleted_at, m.created_at,
                       p.full_name, p.avatar_url,
                       COUNT(*) OVER() AS total
                FROM messages m
                LEFT JOIN profiles p ON p.id = m.sender_id
                WHERE m.conversation_id = $1 AND NOT m.is_deleted
                ORDER BY m.created_at DESC
                LIMIT $2 OFFSET $3
                "#,
                &[&conversation_id, &limit, &offset],
            )
            .await?;

        let total: i64 = rows.first().map(|r| r.get("total")).unwrap_or(0);

        let mut messages: Vec<MessageWithSender> =
            rows.iter().map(MessageWithSender::from_row).collect();
        messages.reverse();

        Ok((messages, total))
    }

    /// Sender of a message, scoped to its conversation. `None` when the
    /// message does not exist in that conversation.
    pub async fn sender_of(
        db: &Pool,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> Result<Option<Uuid>, AppError> {
        let client = db.get().await?;
        let row = client
            .query_opt(
                "SELECT sender_id FROM messages WHERE id = $1 AND conversation_id = $2",
                &[&message_id, &conversation_id],
            )
            .await?;
        Ok(row.map(|r| r.get("sender_id")))
    }

    /// Soft delete: the row is kept for history, only the flag flips.
    pub async fn soft_delete(db: &Pool, message_id: Uuid) -> Result<(), AppError> {
        let client = db.get().await?;
        client
            .execute(
                "UPDATE messages SET is_deleted = TRUE, deleted_at = NOW() WHERE id = $1",
                &[&message_id],
            )
            .await?;
        Ok(())
    }
}
