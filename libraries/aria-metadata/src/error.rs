/// Metadata-specific errors
use std::path::PathBuf;
use thiserror::Error;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The container/tag structure could not be parsed at all.
    ///
    /// Callers skip the file and continue; a single corrupt file never
    /// aborts an indexing run.
    #[error("Unreadable audio file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MetadataError> for aria_core::AriaError {
    fn from(err: MetadataError) -> Self {
        aria_core::AriaError::metadata(err.to_string())
    }
}
