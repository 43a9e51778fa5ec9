//! Shared fixtures for indexer integration tests

use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;

/// Temp library tree + on-disk SQLite catalog
pub struct TestLibrary {
    pub pool: SqlitePool,
    pub root: TempDir,
    _db_dir: TempDir,
}

impl TestLibrary {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", db_dir.path().join("test.db").display());

        let pool = aria_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");
        aria_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            root: tempfile::tempdir().expect("Failed to create library dir"),
            _db_dir: db_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Lay down a WAV file at a library-relative path, creating parents.
    pub fn add_wav(&self, rel_path: &str, seconds: u32) {
        let path = self.root().join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        write_wav(&path, seconds);
    }

    /// Lay down an arbitrary file at a library-relative path.
    pub fn add_file(&self, rel_path: &str, contents: &[u8]) {
        let path = self.root().join(rel_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

/// Write a valid mono 16-bit PCM WAV file of roughly `seconds` seconds.
pub fn write_wav(path: &Path, seconds: u32) {
    let sample_rate: u32 = 8000;
    let byte_rate: u32 = sample_rate * 2;
    let data_len: u32 = byte_rate * seconds;

    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf.resize(44 + data_len as usize, 0);

    std::fs::write(path, buf).expect("failed to write test wav");
}
