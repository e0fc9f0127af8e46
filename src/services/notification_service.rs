//! Translates domain events into persisted notification rows with
//! user-facing copy. Delivery is best-effort: callers route events through
//! the dispatcher (see `dispatcher.rs`) and never block on the outcome.

use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::notification::{ApplicationTarget, NotificationReference, NotificationType};

pub const NO_NOTIFICATION_REASON: &str = "No notification needed for this status";

/// Result of a notify call. `Skipped` is not an error: some domain events
/// (e.g. a `pending` application status) deliberately produce no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Created,
    Skipped { reason: &'static str },
}

/// Parameters for the insert primitive.
pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    pub action_url: Option<String>,
    pub action_text: Option<&'static str>,
    pub reference: Option<NotificationReference>,
    pub from_user_id: Option<Uuid>,
}

pub struct NotificationService {
    db: Pool,
}

impl NotificationService {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }

    /// Insert primitive: one row per call.
    pub async fn create(&self, n: NewNotification) -> Result<(), AppError> {
        let id = Uuid::new_v4();
        let reference_type = n.reference.map(|r| r.kind());
        let reference_id = n.reference.map(|r| r.id());

        let client = self.db.get().await?;
        client
            .execute(
                r#"
                INSERT INTO notifications (
                    id, user_id, notification_type, title, content,
                    action_url, action_text, reference_type, reference_id, from_user_id
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
                &[
                    &id,
                    &n.user_id,
                    &n.notification_type.as_str(),
                    &n.title,
                    &n.content,
                    &n.action_url,
                    &n.action_text,
                    &reference_type,
                    &reference_id,
                    &n.from_user_id,
                ],
            )
            .await?;

        Ok(())
    }

    /// Display name lookup with the "Someone" fallback for absent profiles.
    async fn display_name(&self, user_id: Uuid) -> Result<String, AppError> {
        let client = self.db.get().await?;
        let name: Option<String> = client
            .query_opt("SELECT full_name FROM profiles WHERE id = $1", &[&user_id])
            .await?
            .and_then(|row| row.get("full_name"));
        Ok(name.unwrap_or_else(|| "Someone".to_string()))
    }

    /// Notify a project/job owner that someone applied.
    pub async fn notify_new_application(
        &self,
        owner_id: Uuid,
        applicant_id: Uuid,
        target: ApplicationTarget,
        item_title: &str,
    ) -> Result<NotificationOutcome, AppError> {
        let applicant_name = self.display_name(applicant_id).await?;

        self.create(NewNotification {
            user_id: owner_id,
            notification_type: NotificationType::NewApplication,
            title: "New Application Received".to_string(),
            content: format!(
                "{} has applied to your {}: \"{}\"",
                applicant_name,
                target.label(),
                item_title
            ),
            action_url: Some(format!("/{}s/{}/applications", target.kind(), target.id())),
            action_text: Some("View Application"),
            reference: Some(target.reference()),
            from_user_id: Some(applicant_id),
        })
        .await?;

        Ok(NotificationOutcome::Created)
    }

    /// Notify an applicant of a status change. `pending` and unrecognized
    /// statuses are skipped, not errors.
    pub async fn notify_application_status_change(
        &self,
        applicant_id: Uuid,
        status: &str,
        target: ApplicationTarget,
        item_title: &str,
        from_user_id: Option<Uuid>,
    ) -> Result<NotificationOutcome, AppError> {
        let Some((notification_type, title, content)) = status_copy(status, item_title) else {
            return Ok(NotificationOutcome::Skipped {
                reason: NO_NOTIFICATION_REASON,
            });
        };

        self.create(NewNotification {
            user_id: applicant_id,
            notification_type,
            title: title.to_string(),
            content,
            action_url: Some("/applications".to_string()),
            action_text: Some("View Application"),
            reference: Some(target.reference()),
            from_user_id,
        })
        .await?;

        Ok(NotificationOutcome::Created)
    }

    /// Notify the recipient of a new message. References the conversation so
    /// opening it can mark this notification as read.
    pub async fn notify_new_message(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        conversation_id: Uuid,
        message_preview: &str,
    ) -> Result<NotificationOutcome, AppError> {
        let sender_name = self.display_name(sender_id).await?;

        let content = if message_preview.is_empty() {
            "You have a new message".to_string()
        } else {
            message_preview.to_string()
        };

        self.create(NewNotification {
            user_id: recipient_id,
            notification_type: NotificationType::NewMessage,
            title: format!("New Message from {}", sender_name),
            content,
            action_url: Some(format!("/messages?conversation={}", conversation_id)),
            action_text: Some("View Message"),
            reference: Some(NotificationReference::Message(conversation_id)),
            from_user_id: Some(sender_id),
        })
        .await?;

        Ok(NotificationOutcome::Created)
    }

    pub async fn notify_new_review(
        &self,
        reviewee_id: Uuid,
        reviewer_id: Uuid,
        rating: i32,
        review_id: Uuid,
    ) -> Result<NotificationOutcome, AppError> {
        let reviewer_name = self.display_name(reviewer_id).await?;

        self.create(NewNotification {
            user_id: reviewee_id,
            notification_type: NotificationType::NewReview,
            title: format!("New {}-Star Review", rating),
            content: format!("{} left you a {}-star review", reviewer_name, rating),
            action_url: Some("/profile".to_string()),
            action_text: Some("View Review"),
            reference: Some(NotificationReference::Review(review_id)),
            from_user_id: Some(reviewer_id),
        })
        .await?;

        Ok(NotificationOutcome::Created)
    }

    pub async fn notify_profile_verified(
        &self,
        user_id: Uuid,
        badge_type: Option<&str>,
    ) -> Result<NotificationOutcome, AppError> {
        let badge = badge_type.unwrap_or("verified");

        self.create(NewNotification {
            user_id,
            notification_type: NotificationType::ProfileVerified,
            title: "Profile Verified".to_string(),
            content: format!(
                "Congratulations! Your profile has been verified with a {} badge",
                badge
            ),
            action_url: Some("/profile".to_string()),
            action_text: Some("View Profile"),
            reference: Some(NotificationReference::Profile(user_id)),
            from_user_id: None,
        })
        .await?;

        Ok(NotificationOutcome::Created)
    }

    /// Mark a user's unread message notifications for one conversation as
    /// read. Matched by reference: message notifications carry the
    /// conversation id as their reference.
    pub async fn mark_conversation_read(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<(), AppError> {
        let client = self.db.get().await?;
        client
            .execute(
                r#"
                UPDATE notifications
                SET is_read = TRUE, read_at = NOW()
                WHERE user_id = $1
                  AND reference_type = 'message'
                  AND reference_id = $2
                  AND NOT is_read
                "#,
                &[&user_id, &conversation_id],
            )
            .await?;
        Ok(())
    }
}

/// Map an application status to notification type, title and body. Returns
/// `None` for `pending` and anything unrecognized.
fn status_copy(status: &str, item_title: &str) -> Option<(NotificationType, &'static str, String)> {
    let copy = match status {
        "viewed" => (
            NotificationType::ApplicationViewed,
            "Application Viewed",
            format!("Your application for \"{}\" has been viewed", item_title),
        ),
        "reviewed" => (
            NotificationType::ApplicationStatus,
            "Application Reviewed",
            format!("Your application for \"{}\" has been reviewed", item_title),
        ),
        "shortlisted" => (
            NotificationType::ApplicationShortlisted,
            "Application Shortlisted",
            format!(
                "Congratulations! Your application for \"{}\" has been shortlisted",
                item_title
            ),
        ),
        "interview" => (
            NotificationType::ApplicationShortlisted,
            "Interview Scheduled",
            format!(
                "Great news! You've been selected for an interview for \"{}\"",
                item_title
            ),
        ),
        "accepted" => (
            NotificationType::ApplicationAccepted,
            "Application Accepted",
            format!(
                "Congratulations! Your application for \"{}\" has been accepted",
                item_title
            ),
        ),
        "offer" => (
            NotificationType::ApplicationAccepted,
            "Offer Extended",
            format!("You have received an offer for \"{}\"", item_title),
        ),
        "phone_screen" => (
            NotificationType::ApplicationShortlisted,
            "Phone Screen Scheduled",
            format!("A phone screen has been scheduled for \"{}\"", item_title),
        ),
        "technical_round" => (
            NotificationType::ApplicationShortlisted,
            "Technical Round Scheduled",
            format!("A technical round has been scheduled for \"{}\"", item_title),
        ),
        "rejected" => (
            NotificationType::ApplicationRejected,
            "Application Update",
            format!(
                "Your application for \"{}\" was not selected this time",
                item_title
            ),
        ),
        "withdrawn" => (
            NotificationType::ApplicationStatus,
            "Application Withdrawn",
            format!("Your application for \"{}\" has been withdrawn", item_title),
        ),
        _ => return None,
    };
    Some(copy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_maps_to_application_update() {
        let (ty, title, content) = status_copy("rejected", "RPA Migration").unwrap();
        assert_eq!(ty, NotificationType::ApplicationRejected);
        assert_eq!(title, "Application Update");
        assert_eq!(
            content,
            "Your application for \"RPA Migration\" was not selected this time"
        );
    }

    #[test]
    fn pending_and_unknown_statuses_produce_no_copy() {
        assert!(status_copy("pending", "x").is_none());
        assert!(status_copy("archived", "x").is_none());
        assert!(status_copy("", "x").is_none());
    }

    #[test]
    fn every_enumerated_status_has_copy() {
        for status in [
            "viewed",
            "reviewed",
            "shortlisted",
            "interview",
            "accepted",
            "offer",
            "phone_screen",
            "technical_round",
            "rejected",
            "withdrawn",
        ] {
            assert!(status_copy(status, "t").is_some(), "missing copy for {status}");
        }
    }

    #[test]
    fn interview_variants_share_shortlisted_type() {
        for status in ["interview", "phone_screen", "technical_round"] {
            let (ty, _, _) = status_copy(status, "t").unwrap();
            assert_eq!(ty, NotificationType::ApplicationShortlisted);
        }
    }
}
