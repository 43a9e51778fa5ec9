//! Album artwork: folder cover lookup and embedded picture extraction

use crate::error::MetadataError;
use crate::reader::ordered_tags;
use lofty::PictureType;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Maximum artwork size (5MB)
const MAX_ARTWORK_SIZE: usize = 5 * 1024 * 1024;

/// Folder art candidate filenames, in priority order. Matching is
/// case-sensitive; the first hit wins.
pub const FOLDER_ART_NAMES: &[&str] = &[
    "folder.jpg",
    "Folder.jpg",
    "cover.jpg",
    "Cover.jpg",
    "folder.png",
    "cover.png",
];

/// The first folder-art candidate present in `dir`, by filename.
///
/// Absence is not an error; the indexer records tracks without folder art.
pub fn find_folder_art(dir: &Path) -> Option<&'static str> {
    FOLDER_ART_NAMES
        .iter()
        .find(|name| dir.join(name).is_file())
        .copied()
}

/// Artwork extracted from an audio file
#[derive(Debug, Clone)]
pub struct ArtworkData {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,
}

/// Extracts embedded artwork from audio files, with LRU caching keyed by
/// canonical path.
pub struct ArtExtractor {
    cache: Mutex<LruCache<PathBuf, ArtworkData>>,
}

impl ArtExtractor {
    /// Create a new extractor caching up to `cache_size` images
    /// (0 effectively disables caching).
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Extract the embedded artwork of an audio file.
    ///
    /// Returns `Ok(Some(artwork))` when a picture is found, `Ok(None)` when
    /// the file carries none, and `Err` when the file cannot be read at all.
    ///
    /// Dialects are consulted in the same priority order as tag extraction:
    /// the first tag exposing a non-empty picture list wins, and within it a
    /// front cover is preferred over the first picture.
    pub fn extract(&self, path: &Path) -> Result<Option<ArtworkData>, MetadataError> {
        // Canonicalize path for consistent cache keys
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if let Some(cached) = self.cache.lock().expect("art cache poisoned").get(&canonical) {
            return Ok(Some(cached.clone()));
        }

        match extract_from_file(path)? {
            Some(artwork) => {
                self.cache
                    .lock()
                    .expect("art cache poisoned")
                    .put(canonical, artwork.clone());
                Ok(Some(artwork))
            }
            None => Ok(None),
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache.lock().expect("art cache poisoned").clear();
    }
}

fn extract_from_file(path: &Path) -> Result<Option<ArtworkData>, MetadataError> {
    if !path.exists() {
        return Err(MetadataError::FileNotFound(path.to_path_buf()));
    }

    let tagged_file = lofty::read_from_path(path).map_err(|e| MetadataError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // First dialect with pictures wins
    let tags = ordered_tags(&tagged_file);
    let Some(tag) = tags.iter().find(|tag| !tag.pictures().is_empty()) else {
        return Ok(None);
    };

    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
        .or_else(|| pictures.first());

    let Some(picture) = picture else {
        return Ok(None);
    };

    let data = picture.data();
    if data.len() > MAX_ARTWORK_SIZE {
        return Ok(None);
    }

    // Default to image/jpeg when the tag does not say
    let mime_type = picture
        .mime_type()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "image/jpeg".to_string());

    Ok(Some(ArtworkData {
        data: data.to_vec(),
        mime_type,
    }))
}
