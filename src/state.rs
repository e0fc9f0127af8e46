use crate::{
    config::Config,
    services::{NotificationDispatcher, NotificationService},
};
use deadpool_postgres::Pool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool,
    pub config: Arc<Config>,
    /// Synchronous notification reads/updates (read-marking on open).
    pub notifications: Arc<NotificationService>,
    /// Fire-and-forget fan-out queue for message-producing operations.
    pub dispatcher: NotificationDispatcher,
}
