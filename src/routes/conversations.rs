//! Conversation endpoints: listing, detail (with read-marking side effects),
//! starting/deduplicating direct conversations, and muting.

use actix_web::{get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::guards::{Participant, User},
    models::{
        conversation::{Conversation, ConversationDetail, ConversationListItem},
        message::{preview, MessageWithSender},
        PageQuery, Pagination, DEFAULT_LIMIT, MESSAGES_DEFAULT_LIMIT,
    },
    services::{ConversationService, MessageService, NotificationEvent},
    state::AppState,
};

#[derive(Serialize)]
struct ConversationListResponse {
    conversations: Vec<ConversationListItem>,
    pagination: Pagination,
}

#[derive(Serialize)]
struct ConversationDetailResponse {
    conversation: ConversationDetail,
    messages: Vec<MessageWithSender>,
    pagination: Pagination,
}

#[derive(Deserialize)]
pub struct StartConversationRequest {
    pub recipient_id: Option<Uuid>,
    pub subject: Option<String>,
    /// `message` and `initial_message` are aliases kept for older clients.
    pub message: Option<String>,
    pub initial_message: Option<String>,
    pub conversation_type: Option<String>,
    pub project_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
}

#[derive(Serialize)]
struct StartConversationResponse {
    status: &'static str,
    conversation: Conversation,
    message: MessageWithSender,
}

#[derive(Deserialize)]
pub struct MuteRequest {
    pub is_muted: bool,
}

/// GET /conversations
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    user: User,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let (page, limit, offset) = query.resolve(DEFAULT_LIMIT);

    let (conversations, total) =
        ConversationService::list_for_user(&state.db, user.id, limit, offset).await?;

    let pagination = if total == 0 {
        Pagination::empty(limit)
    } else {
        Pagination::new(page, limit, total)
    };

    Ok(HttpResponse::Ok().json(ConversationListResponse {
        conversations,
        pagination,
    }))
}

/// GET /conversations/{id}
///
/// Opening a conversation is side-effecting: the caller's unread counter is
/// zeroed and their message notifications for this conversation are marked
/// read.
#[get("/conversations/{id}")]
pub async fn get_conversation(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let conversation_id = path.into_inner();
    let (page, limit, offset) = query.resolve(MESSAGES_DEFAULT_LIMIT);

    Participant::verify(&state.db, user.id, conversation_id).await?;

    let conversation = ConversationService::get_detail(&state.db, conversation_id, user.id).await?;
    let (messages, total) =
        MessageService::list_page(&state.db, conversation_id, limit, offset).await?;

    ConversationService::reset_unread(&state.db, conversation_id, user.id).await?;
    state
        .notifications
        .mark_conversation_read(user.id, conversation_id)
        .await?;

    Ok(HttpResponse::Ok().json(ConversationDetailResponse {
        conversation,
        messages,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// POST /conversations
///
/// Direct conversations are deduplicated per participant pair: when one
/// already exists the message is appended to it instead of creating a
/// duplicate.
#[post("/conversations")]
pub async fn start_conversation(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<StartConversationRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let content = body
        .message
        .or(body.initial_message)
        .filter(|m| !m.trim().is_empty());

    let (recipient_id, content) = match (body.recipient_id, content) {
        (Some(r), Some(c)) => (r, c),
        _ => {
            return Err(AppError::BadRequest(
                "Recipient and message are required".into(),
            ))
        }
    };

    if recipient_id == user.id {
        return Err(AppError::BadRequest(
            "Cannot start conversation with yourself".into(),
        ));
    }

    let conversation_type = body.conversation_type.as_deref().unwrap_or("direct");

    if conversation_type == "direct" {
        if let Some(existing_id) =
            ConversationService::find_existing_direct(&state.db, user.id, recipient_id).await?
        {
            let message =
                MessageService::insert(&state.db, existing_id, user.id, &content, None, None)
                    .await?;
            let message_preview = preview(&content);

            ConversationService::touch_last_message(&state.db, existing_id, &message_preview)
                .await?;
            ConversationService::increment_unread_for(&state.db, existing_id, recipient_id)
                .await?;

            state.dispatcher.enqueue(NotificationEvent::NewMessage {
                recipient_id,
                sender_id: user.id,
                conversation_id: existing_id,
                preview: message_preview,
            });

            let conversation = ConversationService::fetch(&state.db, existing_id).await?;

            return Ok(HttpResponse::Ok().json(StartConversationResponse {
                status: "Message sent",
                conversation,
                message,
            }));
        }
    }

    let (conversation, message) = ConversationService::create_with_first_message(
        &state.db,
        user.id,
        recipient_id,
        conversation_type,
        body.subject.as_deref(),
        body.project_id,
        body.job_id,
        &content,
    )
    .await?;

    state.dispatcher.enqueue(NotificationEvent::NewMessage {
        recipient_id,
        sender_id: user.id,
        conversation_id: conversation.id,
        preview: preview(&content),
    });

    Ok(HttpResponse::Created().json(StartConversationResponse {
        status: "Conversation started",
        conversation,
        message,
    }))
}

/// PATCH /conversations/{id}/mute
///
/// Participation is verified first, consistent with the rest of the
/// conversation surface, so non-participants get 403 instead of a silent
/// zero-row update.
#[patch("/conversations/{id}/mute")]
pub async fn mute_conversation(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
    body: web::Json<MuteRequest>,
) -> Result<HttpResponse, AppError> {
    let conversation_id = path.into_inner();

    Participant::verify(&state.db, user.id, conversation_id).await?;
    ConversationService::set_muted(&state.db, conversation_id, user.id, body.is_muted).await?;

    let message = if body.is_muted {
        "Conversation muted"
    } else {
        "Conversation unmuted"
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": message })))
}
