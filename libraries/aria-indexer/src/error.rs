/// Indexing errors
use std::path::PathBuf;
use thiserror::Error;

/// Run-level indexing errors.
///
/// Anything surfacing here aborts the run and lands on the status row as
/// `state = error`; per-file problems are logged and skipped instead.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The configured library root is missing
    #[error("library root does not exist: {0}")]
    MissingRoot(PathBuf),

    /// Catalog write failure
    #[error(transparent)]
    Storage(#[from] aria_storage::StorageError),

    /// I/O error at the orchestration level
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
