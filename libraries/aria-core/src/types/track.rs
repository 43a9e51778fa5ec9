/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// One indexed audio file's extracted and derived facts.
///
/// `file_path` is the catalog key: the file's path relative to the library
/// root. Rows are created or replaced wholesale by an indexing run and never
/// partially mutated outside one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Path relative to the library root (unique catalog key)
    pub file_path: String,

    /// Track title; falls back to the filename stem, never empty
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Album artist
    pub album_artist: Option<String>,

    /// Track number
    pub track_number: Option<u32>,

    /// Disc number
    pub disc_number: Option<u32>,

    /// Duration in seconds
    pub duration: Option<f64>,

    /// Release year
    pub year: Option<i32>,

    /// Genre
    pub genre: Option<String>,

    /// Whether the file carries an embedded picture
    pub has_embedded_art: bool,

    /// Whether a cover image sits next to the file
    pub has_folder_art: bool,

    /// Library-relative path to the folder art, when present
    pub folder_art_path: Option<String>,

    /// File size in bytes
    pub file_size: i64,

    /// Normalized lowercase extension (mp3, m4a, wav, flac)
    pub file_format: String,

    /// Filesystem modification time (Unix epoch seconds)
    pub last_modified: Option<i64>,

    /// When the indexing run recorded this row (Unix epoch seconds)
    pub indexed_at: i64,
}

/// A track row as produced by the indexer, before it has a catalog id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrack {
    /// Path relative to the library root (unique catalog key)
    pub file_path: String,
    /// Track title (filename stem when tags carry none)
    pub title: String,
    /// Artist name
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Album artist
    pub album_artist: Option<String>,
    /// Track number
    pub track_number: Option<u32>,
    /// Disc number
    pub disc_number: Option<u32>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Release year
    pub year: Option<i32>,
    /// Genre
    pub genre: Option<String>,
    /// Whether the file carries an embedded picture
    pub has_embedded_art: bool,
    /// Whether a cover image sits next to the file
    pub has_folder_art: bool,
    /// Library-relative path to the folder art, when present
    pub folder_art_path: Option<String>,
    /// File size in bytes
    pub file_size: i64,
    /// Normalized lowercase extension
    pub file_format: String,
    /// Filesystem modification time (Unix epoch seconds)
    pub last_modified: Option<i64>,
}
