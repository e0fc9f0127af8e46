use dotenvy::dotenv;
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Capacity of the in-process notification dispatch queue. Producers
    /// never block; events beyond this depth are dropped with a warning.
    pub notification_queue_depth: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL is required".into()))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET is required".into()))?;

        let port = env::var("PORT")
            .ok()
            .map(|v| {
                v.parse::<u16>()
                    .map_err(|e| AppError::Config(format!("invalid PORT: {e}")))
            })
            .transpose()?
            .unwrap_or(8080);

        let notification_queue_depth = env::var("NOTIFICATION_QUEUE_DEPTH")
            .ok()
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|e| AppError::Config(format!("invalid NOTIFICATION_QUEUE_DEPTH: {e}")))
            })
            .transpose()?
            .unwrap_or(1024);

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            notification_queue_depth,
        })
    }
}
