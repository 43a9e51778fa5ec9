//! Library indexing run orchestration
//!
//! One run is a state machine persisted in the `index_status` row:
//! idle -> running -> {completed, error}. The run itself is logically
//! sequential; it executes as a detached background task and yields at every
//! catalog commit so streaming and query requests stay responsive while a
//! large tree indexes. Readers may observe a partially populated catalog
//! during a run; that window is accepted and documented.

use crate::error::IndexError;
use crate::m3u;
use aria_core::types::NewTrack;
use aria_metadata::{apply_path_fallback, find_folder_art, TagReader};
use aria_storage::{index_status, playlists, tracks};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use walkdir::WalkDir;

/// Audio file extensions the indexer picks up
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "flac"];

/// Playlist file extensions the indexer imports
pub const PLAYLIST_EXTENSIONS: &[&str] = &["m3u", "m3u8"];

/// Tracks are committed in batches of this many to bound memory and give
/// incremental durability/progress during long runs.
const BATCH_SIZE: usize = 100;

/// The indexing service.
///
/// Owns the single-flight guard: at most one background run at a time,
/// tracked by the task handle (authoritative within this process) and
/// double-checked against the status row (covers a stale `running` row left
/// by a crashed process, which then requires `force`).
pub struct Indexer {
    pool: SqlitePool,
    library_root: PathBuf,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Indexer {
    /// Create an indexer for a library root
    pub fn new(pool: SqlitePool, library_root: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            library_root: library_root.into(),
            task: Mutex::new(None),
        }
    }

    /// The library root this indexer walks
    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Start a background indexing run.
    ///
    /// Returns `true` when a run was started. A second trigger while a run
    /// is live is a no-op unless `force` is set; forcing while live starts a
    /// fresh run and detaches the old one (there is no cancellation).
    pub async fn start(self: Arc<Self>, force: bool) -> Result<bool, IndexError> {
        let mut task = self.task.lock().await;

        let live = task.as_ref().is_some_and(|handle| !handle.is_finished());
        if live && !force {
            tracing::info!("indexing already in progress, ignoring trigger");
            return Ok(false);
        }

        if !live && index_status::running(&self.pool).await?.is_some() && !force {
            // A 'running' row without a live task means a previous process
            // died mid-run; require force to take over.
            tracing::warn!("stale running status row found, refusing to start without force");
            return Ok(false);
        }

        let indexer = Arc::clone(&self);
        *task = Some(tokio::spawn(async move {
            indexer.run().await;
        }));

        Ok(true)
    }

    /// Execute one full run in the foreground (CLI entry point).
    pub async fn run(&self) {
        let status = match index_status::start(&self.pool).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("failed to create index status row: {e}");
                return;
            }
        };

        match self.index_library(status.id).await {
            Ok(processed) => {
                tracing::info!("indexing complete: {processed} files processed");
                if let Err(e) = index_status::complete(&self.pool, status.id).await {
                    tracing::error!("failed to mark indexing completed: {e}");
                }
            }
            Err(e) => {
                tracing::error!("indexing failed: {e}");
                if let Err(e) = index_status::fail(&self.pool, status.id, &e.to_string()).await {
                    tracing::error!("failed to record indexing error: {e}");
                }
            }
        }
    }

    /// The run body. Per-file faults are logged and skipped; any error
    /// escaping here aborts the run and lands on the status row.
    async fn index_library(&self, status_id: i64) -> Result<i64, IndexError> {
        let root = &self.library_root;
        if !root.exists() {
            return Err(IndexError::MissingRoot(root.clone()));
        }

        // Counting pass first, so progress has a stable denominator
        let total = count_candidate_files(root);
        index_status::set_total_files(&self.pool, status_id, total).await?;
        tracing::info!("found {total} files to index under {}", root.display());

        // Full reindex is total replacement: drop all tracks (entry links of
        // user playlists null out via the FK) and all imported playlists.
        tracks::delete_all(&self.pool).await?;
        playlists::delete_imported(&self.pool).await?;

        let reader = TagReader::new();
        let mut batch: Vec<NewTrack> = Vec::with_capacity(BATCH_SIZE);
        let mut playlist_files: Vec<PathBuf> = Vec::new();
        let mut folder_art_cache: HashMap<PathBuf, Option<&'static str>> = HashMap::new();
        let mut processed: i64 = 0;

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(ext) = extension_lowercase(path) else {
                continue;
            };

            if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
                // Folder art is resolved once per directory and reused for
                // every audio file in it
                let dir = path.parent().unwrap_or(root).to_path_buf();
                let folder_art = *folder_art_cache
                    .entry(dir.clone())
                    .or_insert_with(|| find_folder_art(&dir));

                if let Some(track) = process_audio_file(&reader, root, path, folder_art) {
                    batch.push(track);
                }
                processed += 1;

                if batch.len() >= BATCH_SIZE {
                    tracks::insert_batch(&self.pool, &batch).await?;
                    batch.clear();
                    index_status::set_processed_files(&self.pool, status_id, processed).await?;
                    tracing::info!("indexed {processed}/{total} files");
                }
            } else if PLAYLIST_EXTENSIONS.contains(&ext.as_str()) {
                playlist_files.push(path.to_path_buf());
                processed += 1;
            }
        }

        if !batch.is_empty() {
            tracks::insert_batch(&self.pool, &batch).await?;
        }
        index_status::set_processed_files(&self.pool, status_id, processed).await?;

        // Playlists import after all tracks committed, so their entries can
        // resolve against the complete catalog
        for playlist_path in &playlist_files {
            if let Err(e) = self.import_playlist_file(playlist_path).await {
                tracing::warn!(
                    "failed to import playlist {}: {e}",
                    playlist_path.display()
                );
            }
        }

        // Relink entries whose tracks were replaced by this run (user
        // playlists kept their rows, their links were nulled by the clear)
        let relinked = playlists::resolve_entries(&self.pool).await?;
        if relinked > 0 {
            tracing::debug!("re-resolved {relinked} playlist entries");
        }

        Ok(processed)
    }

    /// Parse one playlist file and commit it with its entries.
    async fn import_playlist_file(&self, path: &Path) -> Result<(), IndexError> {
        let bytes = tokio::fs::read(path).await?;
        let content = String::from_utf8_lossy(&bytes);
        let parsed = m3u::parse(&content, path, &self.library_root);

        let mut entries = Vec::with_capacity(parsed.paths.len());
        for track_path in parsed.paths {
            let track_id = tracks::get_id_by_path(&self.pool, &track_path).await?;
            entries.push((track_id, track_path));
        }

        let rel_path = path
            .strip_prefix(&self.library_root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        playlists::import(&self.pool, &parsed.name, Some(&rel_path), &entries).await?;
        tracing::info!("imported playlist: {} ({} entries)", parsed.name, entries.len());
        Ok(())
    }
}

/// Count audio and playlist files under the root, by extension.
fn count_candidate_files(root: &Path) -> i64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            extension_lowercase(entry.path()).is_some_and(|ext| {
                AUDIO_EXTENSIONS.contains(&ext.as_str())
                    || PLAYLIST_EXTENSIONS.contains(&ext.as_str())
            })
        })
        .count() as i64
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Extract and derive one audio file's track record.
///
/// Any failure here (unreadable tags, missing stat, path outside the root)
/// logs and skips the file; a single corrupt file never aborts the run.
fn process_audio_file(
    reader: &TagReader,
    root: &Path,
    path: &Path,
    folder_art: Option<&str>,
) -> Option<NewTrack> {
    let rel_path = match path.strip_prefix(root) {
        Ok(rel) => rel,
        Err(_) => {
            tracing::warn!("skipping file outside library root: {}", path.display());
            return None;
        }
    };

    let fs_meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!("failed to stat {}: {e}", path.display());
            return None;
        }
    };

    let mut tags = match reader.read(path) {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!("skipping unreadable file: {e}");
            return None;
        }
    };

    apply_path_fallback(&mut tags, rel_path);

    let folder_art_path = folder_art.map(|name| {
        rel_path
            .parent()
            .map_or_else(|| name.to_string(), |dir| {
                dir.join(name).to_string_lossy().into_owned()
            })
    });

    let last_modified = fs_meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64);

    Some(NewTrack {
        file_path: rel_path.to_string_lossy().into_owned(),
        title: tags.title.unwrap_or_else(|| "Unknown".to_string()),
        artist: tags.artist,
        album: tags.album,
        album_artist: tags.album_artist,
        track_number: tags.track_number,
        disc_number: tags.disc_number,
        duration: tags.duration,
        year: tags.year,
        genre: tags.genre,
        has_embedded_art: tags.has_embedded_art,
        has_folder_art: folder_art.is_some(),
        folder_art_path,
        file_size: fs_meta.len() as i64,
        file_format: extension_lowercase(path).unwrap_or_default(),
        last_modified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lowercase_normalizes() {
        assert_eq!(extension_lowercase(Path::new("a/b.MP3")), Some("mp3".to_string()));
        assert_eq!(extension_lowercase(Path::new("a/b.flac")), Some("flac".to_string()));
        assert_eq!(extension_lowercase(Path::new("a/noext")), None);
    }

    #[test]
    fn candidate_extensions_cover_audio_and_playlists() {
        assert!(AUDIO_EXTENSIONS.contains(&"wav"));
        assert!(PLAYLIST_EXTENSIONS.contains(&"m3u8"));
        assert!(!AUDIO_EXTENSIONS.contains(&"ogg"));
    }
}
