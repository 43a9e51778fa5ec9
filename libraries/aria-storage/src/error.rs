/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Query execution error
    #[error("Query error: {0}")]
    Query(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<StorageError> for aria_core::AriaError {
    fn from(err: StorageError) -> Self {
        aria_core::AriaError::storage(err.to_string())
    }
}
