//! Playlist types

use crate::types::{PlaylistId, TrackId};
use serde::{Deserialize, Serialize};

/// A named ordered collection of track references.
///
/// User-created playlists survive re-indexing; playlists imported from
/// playlist files on disk are deleted and recreated on every full re-index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    /// Backing M3U file, when imported from or saved to disk
    pub file_path: Option<String>,
    pub is_user_created: bool,
    /// Unix epoch seconds
    pub created_at: i64,
    /// Unix epoch seconds
    pub updated_at: i64,

    /// Entries (optional, populated when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<PlaylistEntry>>,
}

/// One ordered slot in a playlist.
///
/// `track_id` is `None` when the referenced file was not found in the
/// catalog at import time; `track_path` always keeps the raw path so the
/// entry can be displayed and re-resolved by a later indexing run.
/// Positions within one playlist form a dense zero-based sequence after any
/// mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: i64,
    pub playlist_id: PlaylistId,
    pub track_id: Option<TrackId>,
    pub track_path: String,
    pub position: i64,
}

/// Playlist listing row with a denormalized entry count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub name: String,
    pub track_count: i64,
    pub is_user_created: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
