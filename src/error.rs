use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum PresenterError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl PresenterError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<figment::Error> for PresenterError {
    fn from(e: figment::Error) -> Self {
        PresenterError::Config(Box::new(e))
    }
}

impl From<garde::Report> for PresenterError {
    fn from(report: garde::Report) -> Self {
        PresenterError::Validation(report.to_string().trim().to_string())
    }
}

impl IntoResponse for PresenterError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            PresenterError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message,
                },
            ),
            PresenterError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message,
                },
            ),
            PresenterError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message,
                },
            ),
            internal @ (PresenterError::DatabaseError(_)
            | PresenterError::Token(_)
            | PresenterError::PasswordHash(_)
            | PresenterError::TaskJoin(_)
            | PresenterError::Config(_)) => {
                error!(error = %internal, "request failed with internal error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
