//! Authorization guards that enforce participation checks at the type level,
//! so handlers cannot accidentally skip them.

use deadpool_postgres::Pool;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::UserId;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};

/// Authenticated user extracted from JWT claims.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
}

impl FromRequest for User {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let extensions = req.extensions();
        let user_id = extensions.get::<UserId>().map(|u| u.0);

        Box::pin(async move {
            let user_id = user_id.ok_or(AppError::Unauthorized)?;
            Ok(User { id: user_id })
        })
    }
}

/// A verified, active participant of a conversation.
///
/// Verification order matches the API contract: a non-participant gets 403
/// even when the conversation id does not resolve; a participant of a
/// vanished conversation gets 404.
#[derive(Debug, Clone)]
pub struct Participant {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub role: String,
    pub unread_count: i32,
    pub is_muted: bool,
}

impl Participant {
    pub async fn verify(
        db: &Pool,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Self, AppError> {
        let client = db.get().await?;

        let row = client
            .query_opt(
                r#"
                SELECT
                    cp.user_id,
                    cp.conversation_id,
                    cp.role,
                    cp.unread_count,
                    cp.is_muted,
                    (c.id IS NOT NULL) AS conversation_exists
                FROM conversation_participants cp
                LEFT JOIN conversations c
                  ON c.id = cp.conversation_id
                 AND c.status = 'active'
                WHERE cp.user_id = $1
                  AND cp.conversation_id = $2
                  AND cp.is_active
                "#,
                &[&user_id, &conversation_id],
            )
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("You are not a participant in this conversation".into())
            })?;

        let conversation_exists: bool = row.get("conversation_exists");
        if !conversation_exists {
            return Err(AppError::NotFound("Conversation not found".into()));
        }

        Ok(Participant {
            user_id: row.get("user_id"),
            conversation_id: row.get("conversation_id"),
            role: row.get("role"),
            unread_count: row.get("unread_count"),
            is_muted: row.get("is_muted"),
        })
    }
}
