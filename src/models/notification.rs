use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification type enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewApplication,
    ApplicationViewed,
    ApplicationStatus,
    ApplicationShortlisted,
    ApplicationAccepted,
    ApplicationRejected,
    NewMessage,
    NewReview,
    ProfileVerified,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewApplication => "new_application",
            NotificationType::ApplicationViewed => "application_viewed",
            NotificationType::ApplicationStatus => "application_status",
            NotificationType::ApplicationShortlisted => "application_shortlisted",
            NotificationType::ApplicationAccepted => "application_accepted",
            NotificationType::ApplicationRejected => "application_rejected",
            NotificationType::NewMessage => "new_message",
            NotificationType::NewReview => "new_review",
            NotificationType::ProfileVerified => "profile_verified",
        }
    }
}

/// Typed pointer from a notification to the entity that triggered it. The
/// loose (`reference_type`, `reference_id`) column pair exists only at the
/// SQL edge; everything above it handles this enum exhaustively.
///
/// `Message` carries the conversation id, not a message id: message
/// notifications are read back per conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationReference {
    Project(Uuid),
    Job(Uuid),
    Message(Uuid),
    Review(Uuid),
    Profile(Uuid),
}

impl NotificationReference {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationReference::Project(_) => "project",
            NotificationReference::Job(_) => "job",
            NotificationReference::Message(_) => "message",
            NotificationReference::Review(_) => "review",
            NotificationReference::Profile(_) => "profile",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            NotificationReference::Project(id)
            | NotificationReference::Job(id)
            | NotificationReference::Message(id)
            | NotificationReference::Review(id)
            | NotificationReference::Profile(id) => *id,
        }
    }
}

/// What an application points at: a project or a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationTarget {
    Project(Uuid),
    Job(Uuid),
}

impl ApplicationTarget {
    pub fn id(&self) -> Uuid {
        match self {
            ApplicationTarget::Project(id) | ApplicationTarget::Job(id) => *id,
        }
    }

    /// "project" / "job" - used in reference columns and action URLs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApplicationTarget::Project(_) => "project",
            ApplicationTarget::Job(_) => "job",
        }
    }

    /// Human-readable label used in notification copy.
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationTarget::Project(_) => "project",
            ApplicationTarget::Job(_) => "job posting",
        }
    }

    pub fn reference(&self) -> NotificationReference {
        match self {
            ApplicationTarget::Project(id) => NotificationReference::Project(*id),
            ApplicationTarget::Job(id) => NotificationReference::Job(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_lowers_to_expected_column_pair() {
        let id = Uuid::new_v4();
        let r = NotificationReference::Message(id);
        assert_eq!(r.kind(), "message");
        assert_eq!(r.id(), id);

        assert_eq!(NotificationReference::Project(id).kind(), "project");
        assert_eq!(NotificationReference::Review(id).kind(), "review");
        assert_eq!(NotificationReference::Profile(id).kind(), "profile");
        assert_eq!(NotificationReference::Job(id).kind(), "job");
    }

    #[test]
    fn application_target_copy_labels() {
        let id = Uuid::new_v4();
        assert_eq!(ApplicationTarget::Project(id).label(), "project");
        assert_eq!(ApplicationTarget::Job(id).label(), "job posting");
        assert_eq!(ApplicationTarget::Job(id).reference().kind(), "job");
    }

    #[test]
    fn notification_type_db_tags() {
        assert_eq!(NotificationType::ApplicationRejected.as_str(), "application_rejected");
        assert_eq!(NotificationType::NewMessage.as_str(), "new_message");
    }
}
