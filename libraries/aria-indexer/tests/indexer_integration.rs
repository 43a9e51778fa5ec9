//! End-to-end indexing runs against real temp library trees

mod common;

use aria_core::types::IndexState;
use aria_indexer::Indexer;
use aria_storage::{index_status, playlists, tracks};
use common::TestLibrary;
use std::sync::Arc;

#[tokio::test]
async fn untagged_tree_derives_metadata_from_paths() {
    let lib = TestLibrary::new().await;
    lib.add_wav("ArtistX/AlbumY/01 Song.wav", 1);
    lib.add_wav("ArtistZ/loose track.wav", 1);
    lib.add_wav("rootfile.wav", 1);
    lib.add_file("ArtistX/AlbumY/notes.txt", b"ignored");

    let indexer = Indexer::new(lib.pool.clone(), lib.root());
    indexer.run().await;

    let song = tracks::get_by_path(&lib.pool, "ArtistX/AlbumY/01 Song.wav")
        .await
        .unwrap()
        .expect("track indexed");
    assert_eq!(song.title, "01 Song");
    assert_eq!(song.artist.as_deref(), Some("ArtistX"));
    assert_eq!(song.album.as_deref(), Some("AlbumY"));
    assert_eq!(song.file_format, "wav");
    assert!(song.file_size > 0);
    assert!(song.duration.unwrap() > 0.5);

    let loose = tracks::get_by_path(&lib.pool, "ArtistZ/loose track.wav")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loose.title, "loose track");
    assert_eq!(loose.artist.as_deref(), Some("ArtistZ"));
    assert_eq!(loose.album, None);

    let root_track = tracks::get_by_path(&lib.pool, "rootfile.wav")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(root_track.artist, None);

    let stats = tracks::stats(&lib.pool).await.unwrap();
    assert_eq!(stats.tracks, 3);
}

#[tokio::test]
async fn run_records_status_lifecycle() {
    let lib = TestLibrary::new().await;
    lib.add_wav("a/one.wav", 1);
    lib.add_wav("a/two.wav", 1);

    let indexer = Indexer::new(lib.pool.clone(), lib.root());
    indexer.run().await;

    let status = index_status::latest(&lib.pool).await.unwrap().unwrap();
    assert_eq!(status.state, IndexState::Completed);
    assert_eq!(status.total_files, 2);
    assert_eq!(status.processed_files, 2);
    assert!(status.started_at.is_some());
    assert!(status.completed_at.is_some());
}

#[tokio::test]
async fn missing_root_sets_error_state() {
    let lib = TestLibrary::new().await;

    let indexer = Indexer::new(
        lib.pool.clone(),
        lib.root().join("does-not-exist"),
    );
    indexer.run().await;

    let status = index_status::latest(&lib.pool).await.unwrap().unwrap();
    assert_eq!(status.state, IndexState::Error);
    assert!(status
        .error_message
        .unwrap()
        .contains("library root does not exist"));
}

#[tokio::test]
async fn corrupt_file_is_skipped_without_aborting() {
    let lib = TestLibrary::new().await;
    lib.add_wav("good.wav", 1);
    lib.add_file("bad.mp3", b"not really audio");

    let indexer = Indexer::new(lib.pool.clone(), lib.root());
    indexer.run().await;

    let status = index_status::latest(&lib.pool).await.unwrap().unwrap();
    assert_eq!(status.state, IndexState::Completed);
    // Both files count as candidates, only one lands in the catalog
    assert_eq!(status.total_files, 2);
    assert_eq!(status.processed_files, 2);
    assert_eq!(tracks::stats(&lib.pool).await.unwrap().tracks, 1);
}

#[tokio::test]
async fn folder_art_is_resolved_per_directory() {
    let lib = TestLibrary::new().await;
    lib.add_wav("ArtistX/AlbumY/one.wav", 1);
    lib.add_wav("ArtistX/AlbumY/two.wav", 1);
    lib.add_file("ArtistX/AlbumY/cover.jpg", b"\xFF\xD8jpeg");
    lib.add_wav("ArtistX/Bare/three.wav", 1);

    let indexer = Indexer::new(lib.pool.clone(), lib.root());
    indexer.run().await;

    for rel in ["ArtistX/AlbumY/one.wav", "ArtistX/AlbumY/two.wav"] {
        let track = tracks::get_by_path(&lib.pool, rel).await.unwrap().unwrap();
        assert!(track.has_folder_art);
        assert_eq!(
            track.folder_art_path.as_deref(),
            Some("ArtistX/AlbumY/cover.jpg")
        );
    }

    let bare = tracks::get_by_path(&lib.pool, "ArtistX/Bare/three.wav")
        .await
        .unwrap()
        .unwrap();
    assert!(!bare.has_folder_art);
    assert_eq!(bare.folder_art_path, None);
}

#[tokio::test]
async fn playlists_import_after_tracks_with_unresolved_lines() {
    let lib = TestLibrary::new().await;
    lib.add_wav("ArtistX/AlbumY/one.wav", 1);
    lib.add_wav("ArtistX/AlbumY/two.wav", 1);
    lib.add_file(
        "ArtistX/AlbumY/mix.m3u",
        b"#EXTM3U\none.wav\ntwo.wav\nmissing.wav\n",
    );

    let indexer = Indexer::new(lib.pool.clone(), lib.root());
    indexer.run().await;

    let summaries = playlists::get_all(&lib.pool).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "mix");
    assert!(!summaries[0].is_user_created);
    assert_eq!(summaries[0].track_count, 3);

    let entries = playlists::entries(&lib.pool, summaries[0].id).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].track_id.is_some());
    assert_eq!(entries[0].track_path, "ArtistX/AlbumY/one.wav");
    assert!(entries[1].track_id.is_some());
    // Line that resolved nowhere keeps its path but no track link
    assert!(entries[2].track_id.is_none());
    assert_eq!(entries[2].track_path, "ArtistX/AlbumY/missing.wav");
    // Dense zero-based positions in file order
    let positions: Vec<i64> = entries.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn reindex_is_idempotent_for_catalog_state() {
    let lib = TestLibrary::new().await;
    lib.add_wav("ArtistX/AlbumY/one.wav", 1);
    lib.add_wav("ArtistX/AlbumY/two.wav", 1);
    lib.add_file("ArtistX/AlbumY/mix.m3u", b"one.wav\n");

    let indexer = Indexer::new(lib.pool.clone(), lib.root());
    indexer.run().await;

    let snapshot = |tracks: Vec<aria_core::types::Track>| {
        let mut rows: Vec<(String, String, Option<String>, Option<String>)> = tracks
            .into_iter()
            .map(|t| (t.file_path, t.title, t.artist, t.album))
            .collect();
        rows.sort();
        rows
    };

    let first = snapshot(
        tracks::list(&lib.pool, &aria_storage::tracks::TrackQuery { limit: 100, ..Default::default() })
            .await
            .unwrap(),
    );

    indexer.run().await;

    let second = snapshot(
        tracks::list(&lib.pool, &aria_storage::tracks::TrackQuery { limit: 100, ..Default::default() })
            .await
            .unwrap(),
    );

    assert_eq!(first, second);

    // Imported playlists are replaced, not duplicated
    let summaries = playlists::get_all(&lib.pool).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].track_count, 1);
}

#[tokio::test]
async fn reindex_preserves_user_playlists_and_relinks_entries() {
    let lib = TestLibrary::new().await;
    lib.add_wav("ArtistX/AlbumY/keeper.wav", 1);

    let indexer = Indexer::new(lib.pool.clone(), lib.root());
    indexer.run().await;

    let old_id = tracks::get_id_by_path(&lib.pool, "ArtistX/AlbumY/keeper.wav")
        .await
        .unwrap()
        .unwrap();

    let mine = playlists::create(&lib.pool, "Mine").await.unwrap();
    playlists::add_entry(&lib.pool, mine.id, Some(old_id), "ArtistX/AlbumY/keeper.wav", None)
        .await
        .unwrap();

    indexer.run().await;

    let kept = playlists::get_with_entries(&lib.pool, mine.id)
        .await
        .unwrap()
        .expect("user playlist survives reindex");
    assert!(kept.is_user_created);
    let entries = kept.entries.unwrap();
    assert_eq!(entries.len(), 1);

    let new_id = tracks::get_id_by_path(&lib.pool, "ArtistX/AlbumY/keeper.wav")
        .await
        .unwrap()
        .unwrap();
    // The entry points at the re-indexed row for the same catalog path
    assert_eq!(entries[0].track_id, Some(new_id));
}

#[tokio::test]
async fn start_is_single_flight() {
    let lib = TestLibrary::new().await;
    lib.add_wav("a/one.wav", 1);

    let indexer = Arc::new(Indexer::new(lib.pool.clone(), lib.root()));

    let started = Arc::clone(&indexer).start(false).await.unwrap();
    assert!(started);

    // Wait for the background run to finish before the temp dirs drop
    for _ in 0..200 {
        if let Some(status) = index_status::latest(&lib.pool).await.unwrap() {
            if status.state != IndexState::Running {
                break;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let status = index_status::latest(&lib.pool).await.unwrap().unwrap();
    assert_eq!(status.state, IndexState::Completed);

    // A finished handle no longer blocks the next trigger
    let started_again = Arc::clone(&indexer).start(false).await.unwrap();
    assert!(started_again);
}
