//! Aria Indexer
//!
//! The library indexing pipeline: walks the music tree, extracts metadata
//! (with path-based fallbacks), commits the catalog in batches, and imports
//! playlist files once the track catalog is complete.
//!
//! A full re-index is total replacement, not an incremental merge: there is
//! no per-file change detection. Only one run may be active at a time; the
//! [`Indexer`] service owns the background task handle and the status row
//! records progress for the status endpoint.

#![forbid(unsafe_code)]

mod error;
mod indexer;
pub mod m3u;

pub use error::IndexError;
pub use indexer::{Indexer, AUDIO_EXTENSIONS, PLAYLIST_EXTENSIONS};

/// Result type alias using `IndexError`
pub type Result<T> = std::result::Result<T, IndexError>;
