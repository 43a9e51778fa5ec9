//! Path-based metadata fallback
//!
//! Applied after tag extraction when title/artist/album are still missing.
//! Assumes the common `Artist/Album/Track` (or flatter `Artist/Track`)
//! library layouts; a track sitting directly in the library root gets only
//! the filename-stem title.

use crate::reader::FileTags;
use std::path::Path;

/// Fill missing title/artist/album from the track's library-relative path.
///
/// - Title defaults to the filename without extension.
/// - With at least 3 path segments, the third-from-last segment fills a
///   missing artist and the second-from-last a missing album.
/// - With 2 segments, the second-from-last fills a missing artist.
pub fn apply_path_fallback(tags: &mut FileTags, rel_path: &Path) {
    if tags.title.as_deref().unwrap_or("").is_empty() {
        tags.title = rel_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string);
    }

    if tags.artist.is_some() && tags.album.is_some() {
        return;
    }

    let segments: Vec<&str> = rel_path
        .iter()
        .filter_map(|segment| segment.to_str())
        .collect();

    if segments.len() >= 3 {
        // Artist/Album/Track structure
        if tags.artist.is_none() {
            tags.artist = Some(segments[segments.len() - 3].to_string());
        }
        if tags.album.is_none() {
            tags.album = Some(segments[segments.len() - 2].to_string());
        }
    } else if segments.len() >= 2 && tags.artist.is_none() {
        // Artist/Track structure
        tags.artist = Some(segments[segments.len() - 2].to_string());
    }
}
