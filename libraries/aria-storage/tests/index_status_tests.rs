//! Integration tests for the index status row lifecycle

mod test_helpers;

use aria_core::types::IndexState;
use aria_storage::index_status;
use test_helpers::TestDb;

#[tokio::test]
async fn no_runs_means_no_latest_row() {
    let test_db = TestDb::new().await;
    assert!(index_status::latest(test_db.pool()).await.unwrap().is_none());
    assert!(index_status::running(test_db.pool()).await.unwrap().is_none());
}

#[tokio::test]
async fn start_creates_running_row() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let status = index_status::start(pool).await.unwrap();
    assert_eq!(status.state, IndexState::Running);
    assert!(status.started_at.is_some());

    let running = index_status::running(pool).await.unwrap().unwrap();
    assert_eq!(running.id, status.id);
}

#[tokio::test]
async fn progress_and_completion_update_in_place() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let status = index_status::start(pool).await.unwrap();
    index_status::set_total_files(pool, status.id, 250).await.unwrap();
    index_status::set_processed_files(pool, status.id, 100).await.unwrap();
    index_status::set_processed_files(pool, status.id, 250).await.unwrap();
    index_status::complete(pool, status.id).await.unwrap();

    let latest = index_status::latest(pool).await.unwrap().unwrap();
    assert_eq!(latest.id, status.id);
    assert_eq!(latest.state, IndexState::Completed);
    assert_eq!(latest.total_files, 250);
    assert_eq!(latest.processed_files, 250);
    assert!(latest.completed_at.is_some());
    assert!(latest.error_message.is_none());

    assert!(index_status::running(pool).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_run_records_message() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let status = index_status::start(pool).await.unwrap();
    index_status::fail(pool, status.id, "library root does not exist: /music")
        .await
        .unwrap();

    let latest = index_status::latest(pool).await.unwrap().unwrap();
    assert_eq!(latest.state, IndexState::Error);
    assert_eq!(
        latest.error_message.as_deref(),
        Some("library root does not exist: /music")
    );
}

#[tokio::test]
async fn latest_prefers_newest_run() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let first = index_status::start(pool).await.unwrap();
    index_status::complete(pool, first.id).await.unwrap();
    let second = index_status::start(pool).await.unwrap();

    let latest = index_status::latest(pool).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.state, IndexState::Running);
}
