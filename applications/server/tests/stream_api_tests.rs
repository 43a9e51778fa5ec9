//! Streaming endpoint contracts: status codes, range semantics, containment

mod common;

use axum::http::StatusCode;
use common::{body_bytes, TestServer};

fn thousand_bytes() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn full_file_streams_with_200_and_exact_length() {
    let server = TestServer::new().await;
    let contents = thousand_bytes();
    server.add_music_file("album/song.mp3", &contents);

    let response = server.get("/stream/album/song.mp3").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["accept-ranges"], "bytes");
    assert_eq!(response.headers()["content-length"], "1000");
    assert_eq!(response.headers()["content-type"], "audio/mpeg");

    let body = body_bytes(response).await;
    assert_eq!(body, contents);
}

#[tokio::test]
async fn range_request_returns_exact_window() {
    let server = TestServer::new().await;
    let contents = thousand_bytes();
    server.add_music_file("song.mp3", &contents);

    let response = server
        .get_with_range("/stream/song.mp3", "bytes=100-199")
        .await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()["content-range"], "bytes 100-199/1000");
    assert_eq!(response.headers()["content-length"], "100");
    assert_eq!(response.headers()["accept-ranges"], "bytes");

    let body = body_bytes(response).await;
    assert_eq!(body, &contents[100..200]);
}

#[tokio::test]
async fn range_end_clamps_to_file_size() {
    let server = TestServer::new().await;
    server.add_music_file("song.mp3", &thousand_bytes());

    let response = server
        .get_with_range("/stream/song.mp3", "bytes=900-2000")
        .await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()["content-range"], "bytes 900-999/1000");
    assert_eq!(response.headers()["content-length"], "100");
}

#[tokio::test]
async fn open_ended_range_reads_to_last_byte() {
    let server = TestServer::new().await;
    let contents = thousand_bytes();
    server.add_music_file("song.mp3", &contents);

    let response = server.get_with_range("/stream/song.mp3", "bytes=990-").await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()["content-range"], "bytes 990-999/1000");

    let body = body_bytes(response).await;
    assert_eq!(body, &contents[990..]);
}

#[tokio::test]
async fn inverted_range_is_416() {
    let server = TestServer::new().await;
    server.add_music_file("song.mp3", &thousand_bytes());

    let response = server
        .get_with_range("/stream/song.mp3", "bytes=500-100")
        .await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
}

#[tokio::test]
async fn malformed_range_is_416() {
    let server = TestServer::new().await;
    server.add_music_file("song.mp3", &thousand_bytes());

    for bad in ["bytes=abc-def", "chunks=0-100", "bytes=12"] {
        let response = server.get_with_range("/stream/song.mp3", bad).await;
        assert_eq!(
            response.status(),
            StatusCode::RANGE_NOT_SATISFIABLE,
            "header {bad:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn traversal_outside_library_is_403() {
    let server = TestServer::new().await;
    // A real file one level above the music root
    std::fs::write(server.parent.path().join("secret.txt"), b"top secret").unwrap();

    let response = server.get("/stream/../secret.txt").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_file_is_404() {
    let server = TestServer::new().await;

    let response = server.get("/stream/nope.mp3").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn directory_path_is_400() {
    let server = TestServer::new().await;
    server.add_music_file("albums/one/song.mp3", b"x");

    let response = server.get("/stream/albums/one").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn folder_art_serves_with_containment() {
    let server = TestServer::new().await;
    server.add_music_file("album/cover.jpg", b"\xFF\xD8\xFF\xE0fakejpeg");

    let response = server.get("/stream/art/album/cover.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(body_bytes(response).await, b"\xFF\xD8\xFF\xE0fakejpeg");

    // Same traversal rules as raw streaming
    std::fs::write(server.parent.path().join("evil.jpg"), b"no").unwrap();
    let response = server.get("/stream/art/../evil.jpg").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = server.get("/stream/art/album/absent.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn embedded_art_missing_track_is_404() {
    let server = TestServer::new().await;

    let response = server.get("/stream/art/embedded/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn embedded_art_without_flag_is_404() {
    let server = TestServer::new().await;
    server.add_wav("plain.wav", 1);

    // Index so the track row exists (a WAV with no pictures)
    server.state.indexer.run().await;

    let track = aria_storage::tracks::get_by_path(&server.state.pool, "plain.wav")
        .await
        .unwrap()
        .expect("track indexed");
    assert!(!track.has_embedded_art);

    let response = server
        .get(&format!("/stream/art/embedded/{}", track.id))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_extension_falls_back_to_octet_stream() {
    let server = TestServer::new().await;
    server.add_music_file("blob.weird", b"data");

    let response = server.get("/stream/blob.weird").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/octet-stream"
    );
}
