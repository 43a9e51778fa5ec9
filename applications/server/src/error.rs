/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Renderer error: {0}")]
    Renderer(#[from] crate::services::renderers::RendererError),

    #[error("Database error: {0}")]
    Storage(#[from] aria_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ServerError::InvalidRange(msg) => (StatusCode::RANGE_NOT_SATISFIABLE, msg),
            ServerError::Renderer(ref e) => match e {
                crate::services::renderers::RendererError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, e.to_string())
                }
                crate::services::renderers::RendererError::Operation(_) => {
                    tracing::error!("Renderer error: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
            ServerError::Storage(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
