//! Aria Core
//!
//! Platform-agnostic domain types, error handling, and path helpers for the
//! Aria media server.
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `PlaylistEntry`, `IndexStatus`
//! - **Error Handling**: unified `AriaError` and `Result` types
//! - **Path Helpers**: lexical normalization used by the streaming
//!   containment check and the playlist importer

#![forbid(unsafe_code)]

pub mod error;
pub mod paths;
pub mod types;

// Re-export commonly used types
pub use error::{AriaError, Result};
pub use types::{
    IndexState, IndexStatus, NewTrack, Playlist, PlaylistEntry, PlaylistId, PlaylistSummary,
    Track, TrackId,
};
