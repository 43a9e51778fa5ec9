//! Index status tracking storage
//!
//! One row per indexing run, updated in place; the latest row is what the
//! status endpoint reports. The `running` lookup backs the advisory
//! single-run guard (the authoritative claim is the in-process task handle).
//!
//! # Example
//!
//! ```rust,no_run
//! use aria_storage::index_status;
//!
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! // Start a new run
//! let status = index_status::start(pool).await?;
//!
//! // Fix the progress denominator, then report progress
//! index_status::set_total_files(pool, status.id, 1000).await?;
//! index_status::set_processed_files(pool, status.id, 100).await?;
//!
//! // Finish the run
//! index_status::complete(pool, status.id).await?;
//! # Ok(())
//! # }
//! ```

use aria_core::types::{IndexState, IndexStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::StorageError;

type Result<T> = std::result::Result<T, StorageError>;

fn status_from_row(row: &SqliteRow) -> IndexStatus {
    IndexStatus {
        id: row.get("id"),
        state: IndexState::from_str(&row.get::<String, _>("status")).unwrap_or(IndexState::Running),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
        total_files: row.get("total_files"),
        processed_files: row.get("processed_files"),
        error_message: row.get("error_message"),
    }
}

/// Get the most recent run (if any)
pub async fn latest(pool: &SqlitePool) -> Result<Option<IndexStatus>> {
    let row = sqlx::query(
        "SELECT id, status, started_at, completed_at, total_files, processed_files, error_message
         FROM index_status
         ORDER BY id DESC
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| status_from_row(&row)))
}

/// Get the currently running run (if any)
pub async fn running(pool: &SqlitePool) -> Result<Option<IndexStatus>> {
    let row = sqlx::query(
        "SELECT id, status, started_at, completed_at, total_files, processed_files, error_message
         FROM index_status
         WHERE status = 'running'
         ORDER BY id DESC
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| status_from_row(&row)))
}

/// Create the status row for a new run
pub async fn start(pool: &SqlitePool) -> Result<IndexStatus> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO index_status (status, started_at, total_files, processed_files)
         VALUES ('running', ?, 0, 0)",
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(IndexStatus {
        id: result.last_insert_rowid(),
        state: IndexState::Running,
        started_at: Some(now),
        completed_at: None,
        total_files: 0,
        processed_files: 0,
        error_message: None,
    })
}

/// Fix the total file count discovered by the counting pass
pub async fn set_total_files(pool: &SqlitePool, id: i64, total: i64) -> Result<()> {
    sqlx::query("UPDATE index_status SET total_files = ? WHERE id = ?")
        .bind(total)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Record progress; `processed` only ever grows within a run
pub async fn set_processed_files(pool: &SqlitePool, id: i64, processed: i64) -> Result<()> {
    sqlx::query("UPDATE index_status SET processed_files = ? WHERE id = ?")
        .bind(processed)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Mark a run as completed
pub async fn complete(pool: &SqlitePool, id: i64) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query("UPDATE index_status SET status = 'completed', completed_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Mark a run as failed with the causing message
pub async fn fail(pool: &SqlitePool, id: i64, error_message: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "UPDATE index_status SET status = 'error', completed_at = ?, error_message = ? WHERE id = ?",
    )
    .bind(now)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
