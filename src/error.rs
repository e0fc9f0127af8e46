use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<tokio_postgres::Error> for AppError {
    fn from(e: tokio_postgres::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        AppError::Database(e.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Config(_) | AppError::StartServer(_) | AppError::Database(_) => 500,
        }
    }

    /// Message safe to expose to the client. Storage and configuration
    /// failures are logged server-side and replaced with a generic message.
    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::Forbidden(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::Config(_) | AppError::StartServer(_) | AppError::Database(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        if self.status_code() >= 500 {
            tracing::error!(error = %self, "request failed");
        }
        let status = actix_web::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(json!({ "error": self.client_message() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(AppError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AppError::Unauthorized.status_code(), 401);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
        assert_eq!(AppError::Database("boom".into()).status_code(), 500);
    }

    #[test]
    fn storage_errors_are_not_leaked_to_clients() {
        let err = AppError::Database("connection refused at 10.0.0.3".into());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AppError::Forbidden("You can only delete your own messages".into());
        assert_eq!(err.client_message(), "You can only delete your own messages");
    }
}
