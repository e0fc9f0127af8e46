pub mod conversation_service;
pub mod dispatcher;
pub mod message_service;
pub mod notification_service;

pub use conversation_service::ConversationService;
pub use dispatcher::{NotificationDispatcher, NotificationEvent, NotificationSink};
pub use message_service::MessageService;
pub use notification_service::{NotificationOutcome, NotificationService};
