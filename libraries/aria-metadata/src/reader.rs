//! Metadata reader implementation using lofty
//!
//! A file may carry several tag dialects at once (an MP3 with ID3v2 and
//! ID3v1, a FLAC with Vorbis comments and a stray ID3 block). Lofty exposes
//! each dialect as one `Tag`; this reader walks them in priority order
//! (primary tag first) and, per field, an ordered candidate-key list,
//! accepting the first non-empty value. Per-field failures are swallowed —
//! only a total open/parse failure surfaces, as `Unreadable`.

use crate::error::MetadataError;
use lofty::{Accessor, AudioFile, ItemKey, Probe, Tag, TaggedFile, TaggedFileExt};
use std::path::Path;

/// Normalized tag record for one audio file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileTags {
    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Album artist (may differ from track artist)
    pub album_artist: Option<String>,

    /// Genre
    pub genre: Option<String>,

    /// Track number (the N of an "N/total" pair)
    pub track_number: Option<u32>,

    /// Disc number (the N of an "N/total" pair)
    pub disc_number: Option<u32>,

    /// Release year
    pub year: Option<i32>,

    /// Duration in seconds, from the container properties
    pub duration: Option<f64>,

    /// Whether any tag dialect exposes an attached picture
    pub has_embedded_art: bool,
}

// Candidate keys per field, in lookup order. Lofty maps each dialect's raw
// frame/comment/atom names onto these, so one ordered list covers ID3v2
// frames, Vorbis comments, and MP4 atoms alike.
const TITLE_KEYS: &[ItemKey] = &[ItemKey::TrackTitle];
const ARTIST_KEYS: &[ItemKey] = &[ItemKey::TrackArtist];
const ALBUM_KEYS: &[ItemKey] = &[ItemKey::AlbumTitle];
const ALBUM_ARTIST_KEYS: &[ItemKey] = &[ItemKey::AlbumArtist];
const GENRE_KEYS: &[ItemKey] = &[ItemKey::Genre];
const DATE_KEYS: &[ItemKey] = &[ItemKey::Year, ItemKey::RecordingDate, ItemKey::OriginalReleaseDate];
const TRACK_KEYS: &[ItemKey] = &[ItemKey::TrackNumber];
const DISC_KEYS: &[ItemKey] = &[ItemKey::DiscNumber];

/// Tag reader backed by the lofty library
pub struct TagReader;

impl TagReader {
    /// Create a new tag reader
    pub fn new() -> Self {
        Self
    }

    /// Parse one audio file into a [`FileTags`] record.
    ///
    /// # Errors
    ///
    /// `FileNotFound` when the path is missing, `Unreadable` when the
    /// container cannot be parsed at all. Missing or malformed individual
    /// fields never error; they come back unset.
    pub fn read(&self, path: &Path) -> Result<FileTags, MetadataError> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.to_path_buf()));
        }

        let tagged_file = Probe::open(path)
            .map_err(|e| MetadataError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .read()
            .map_err(|e| MetadataError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let duration = tagged_file.properties().duration().as_secs_f64();
        let tags = ordered_tags(&tagged_file);

        let track_number = first_text(&tags, TRACK_KEYS)
            .as_deref()
            .and_then(parse_index)
            .or_else(|| tags.iter().find_map(|tag| tag.track()));
        let disc_number = first_text(&tags, DISC_KEYS)
            .as_deref()
            .and_then(parse_index)
            .or_else(|| tags.iter().find_map(|tag| tag.disk()));
        let year = first_text(&tags, DATE_KEYS)
            .as_deref()
            .and_then(parse_year)
            .or_else(|| tags.iter().find_map(|tag| tag.year()).map(|y| y as i32));

        Ok(FileTags {
            title: first_text(&tags, TITLE_KEYS),
            artist: first_text(&tags, ARTIST_KEYS),
            album: first_text(&tags, ALBUM_KEYS),
            album_artist: first_text(&tags, ALBUM_ARTIST_KEYS),
            genre: first_text(&tags, GENRE_KEYS),
            track_number,
            disc_number,
            year,
            duration: Some(duration),
            has_embedded_art: tags.iter().any(|tag| !tag.pictures().is_empty()),
        })
    }
}

impl Default for TagReader {
    fn default() -> Self {
        Self::new()
    }
}

/// The file's tags in dialect priority order: the format's primary tag
/// first, then any remaining dialects in the order lofty found them.
pub(crate) fn ordered_tags(file: &TaggedFile) -> Vec<&Tag> {
    let mut tags: Vec<&Tag> = Vec::new();
    if let Some(primary) = file.primary_tag() {
        tags.push(primary);
    }
    for tag in file.tags() {
        if !tags.iter().any(|t| t.tag_type() == tag.tag_type()) {
            tags.push(tag);
        }
    }
    tags
}

/// First non-empty text value across tags (dialect order) and candidate keys
fn first_text(tags: &[&Tag], keys: &[ItemKey]) -> Option<String> {
    for tag in tags {
        for key in keys {
            if let Some(text) = tag.get_string(key) {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }
    None
}

/// Parse the N of a track/disc value that may read "N" or "N/total"
fn parse_index(value: &str) -> Option<u32> {
    value.split('/').next()?.trim().parse().ok()
}

/// Parse a year from the first four characters of a date-like value
fn parse_year(value: &str) -> Option<i32> {
    let prefix: String = value.chars().take(4).collect();
    prefix.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_index_accepts_bare_and_paired_forms() {
        assert_eq!(parse_index("7"), Some(7));
        assert_eq!(parse_index("3/12"), Some(3));
        assert_eq!(parse_index(" 3 / 12 "), Some(3));
        assert_eq!(parse_index("A/12"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn parse_year_takes_first_four_characters() {
        assert_eq!(parse_year("1994"), Some(1994));
        assert_eq!(parse_year("1994-06-01"), Some(1994));
        assert_eq!(parse_year("2021-11-05T00:00:00"), Some(2021));
        assert_eq!(parse_year("unknown"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn read_nonexistent_file_returns_error() {
        let reader = TagReader::new();
        let result = reader.read(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(MetadataError::FileNotFound(_))));
    }

    #[test]
    fn read_garbage_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"this is not an audio file").unwrap();

        let result = TagReader::new().read(&path);
        assert!(matches!(result, Err(MetadataError::Unreadable { .. })));
    }
}
