//! Bounded in-process work queue for notification dispatch.
//!
//! Request handlers enqueue events and move on; a single worker task drains
//! the queue and writes notification rows. Delivery stays at-most-once: a
//! full queue drops the event with a warning and delivery errors are logged,
//! never surfaced to the request that produced them.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::notification::ApplicationTarget;
use crate::services::notification_service::{NotificationOutcome, NotificationService};

/// Domain events that fan out to notification rows.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    NewApplication {
        owner_id: Uuid,
        applicant_id: Uuid,
        target: ApplicationTarget,
        item_title: String,
    },
    ApplicationStatusChanged {
        applicant_id: Uuid,
        status: String,
        target: ApplicationTarget,
        item_title: String,
        changed_by: Option<Uuid>,
    },
    NewMessage {
        recipient_id: Uuid,
        sender_id: Uuid,
        conversation_id: Uuid,
        preview: String,
    },
    NewReview {
        reviewee_id: Uuid,
        reviewer_id: Uuid,
        rating: i32,
        review_id: Uuid,
    },
    ProfileVerified {
        user_id: Uuid,
        badge_type: Option<String>,
    },
}

/// Delivery seam between the queue worker and storage.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn deliver(&self, event: NotificationEvent) -> Result<NotificationOutcome, AppError>;
}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn deliver(&self, event: NotificationEvent) -> Result<NotificationOutcome, AppError> {
        match event {
            NotificationEvent::NewApplication {
                owner_id,
                applicant_id,
                target,
                item_title,
            } => {
                self.notify_new_application(owner_id, applicant_id, target, &item_title)
                    .await
            }
            NotificationEvent::ApplicationStatusChanged {
                applicant_id,
                status,
                target,
                item_title,
                changed_by,
            } => {
                self.notify_application_status_change(
                    applicant_id,
                    &status,
                    target,
                    &item_title,
                    changed_by,
                )
                .await
            }
            NotificationEvent::NewMessage {
                recipient_id,
                sender_id,
                conversation_id,
                preview,
            } => {
                self.notify_new_message(recipient_id, sender_id, conversation_id, &preview)
                    .await
            }
            NotificationEvent::NewReview {
                reviewee_id,
                reviewer_id,
                rating,
                review_id,
            } => {
                self.notify_new_review(reviewee_id, reviewer_id, rating, review_id)
                    .await
            }
            NotificationEvent::ProfileVerified { user_id, badge_type } => {
                self.notify_profile_verified(user_id, badge_type.as_deref())
                    .await
            }
        }
    }
}

/// Cloneable handle for enqueuing events.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<NotificationEvent>,
}

impl NotificationDispatcher {
    /// Spawn the worker draining the queue into `sink`. The worker exits when
    /// every dispatcher handle has been dropped.
    pub fn spawn(sink: Arc<dyn NotificationSink>, depth: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<NotificationEvent>(depth);

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match sink.deliver(event).await {
                    Ok(NotificationOutcome::Created) => {}
                    Ok(NotificationOutcome::Skipped { reason }) => {
                        tracing::debug!(reason, "notification skipped");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to send notification");
                    }
                }
            }
        });

        (Self { tx }, handle)
    }

    /// Best-effort enqueue. Never blocks the request path; a full or closed
    /// queue drops the event.
    pub fn enqueue(&self, event: NotificationEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, "notification queue full, dropping event");
        }
    }
}
