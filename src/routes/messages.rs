//! Message endpoints: sending into a conversation and soft-deleting own
//! messages.

use actix_web::{delete, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::guards::{Participant, User},
    models::message::{preview, MessageWithSender},
    services::{ConversationService, MessageService, NotificationEvent},
    state::AppState,
};

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub reply_to_id: Option<Uuid>,
    pub attachments: Option<JsonValue>,
}

#[derive(Serialize)]
struct SendMessageResponse {
    message: MessageWithSender,
}

/// POST /conversations/{id}/messages
#[post("/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let conversation_id = path.into_inner();
    let body = body.into_inner();

    let content = body
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Message content is required".into()))?;

    Participant::verify(&state.db, user.id, conversation_id).await?;

    let message = MessageService::insert(
        &state.db,
        conversation_id,
        user.id,
        &content,
        body.reply_to_id,
        body.attachments,
    )
    .await?;

    let message_preview = preview(&content);
    ConversationService::touch_last_message(&state.db, conversation_id, &message_preview).await?;

    // Atomic server-side increment; returns the recipients for fan-out.
    let recipients =
        ConversationService::increment_unread_except(&state.db, conversation_id, user.id).await?;

    for recipient_id in recipients {
        state.dispatcher.enqueue(NotificationEvent::NewMessage {
            recipient_id,
            sender_id: user.id,
            conversation_id,
            preview: message_preview.clone(),
        });
    }

    Ok(HttpResponse::Created().json(SendMessageResponse { message }))
}

/// DELETE /conversations/{conversation_id}/messages/{message_id}
///
/// Ownership check is a direct sender lookup: only the original sender may
/// soft-delete, regardless of participant role.
#[delete("/conversations/{conversation_id}/messages/{message_id}")]
pub async fn delete_message(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (conversation_id, message_id) = path.into_inner();

    let sender_id = MessageService::sender_of(&state.db, conversation_id, message_id).await?;
    if sender_id != Some(user.id) {
        return Err(AppError::Forbidden(
            "You can only delete your own messages".into(),
        ));
    }

    MessageService::soft_delete(&state.db, message_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Message deleted" })))
}
