/// Router construction
use crate::{api, state::AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router.
pub fn create_router(app_state: AppState) -> Router {
    let library_routes = Router::new()
        .route("/status", get(api::library::status))
        .route("/reindex", post(api::library::reindex))
        .route("/stats", get(api::library::stats))
        .route("/artists", get(api::library::artists))
        .route("/artists/:artist/albums", get(api::library::artist_albums))
        .route("/albums", get(api::library::albums))
        .route("/albums/:album/tracks", get(api::library::album_tracks))
        .route("/tracks", get(api::library::list_tracks))
        .route("/tracks/:id", get(api::library::get_track))
        .route("/search", get(api::library::search));

    let playlist_routes = Router::new()
        .route(
            "/",
            get(api::playlists::list_playlists).post(api::playlists::create_playlist),
        )
        .route(
            "/:id",
            get(api::playlists::get_playlist)
                .put(api::playlists::rename_playlist)
                .delete(api::playlists::delete_playlist),
        )
        .route("/:id/tracks", post(api::playlists::add_track_to_playlist))
        .route(
            "/:id/tracks/:position",
            delete(api::playlists::remove_track_from_playlist),
        )
        .route("/:id/reorder", put(api::playlists::reorder_playlist))
        .route("/:id/save", post(api::playlists::save_playlist));

    let renderer_routes = Router::new()
        .route("/devices", get(api::renderers::list_devices))
        .route("/refresh", post(api::renderers::refresh))
        .route("/devices/:id", get(api::renderers::get_device))
        .route("/devices/:id/now-playing", get(api::renderers::now_playing))
        .route("/devices/:id/play", post(api::renderers::play))
        .route("/devices/:id/pause", post(api::renderers::pause))
        .route("/devices/:id/stop", post(api::renderers::stop))
        .route("/devices/:id/next", post(api::renderers::next))
        .route("/devices/:id/previous", post(api::renderers::previous))
        .route("/devices/:id/volume", post(api::renderers::set_volume))
        .route("/devices/:id/mute", post(api::renderers::toggle_mute))
        .route("/devices/:id/queue", get(api::renderers::get_queue))
        .route("/devices/:id/queue/clear", post(api::renderers::clear_queue))
        .route("/devices/:id/play-uri", post(api::renderers::play_uri))
        .route("/devices/:id/add-to-queue", post(api::renderers::add_to_queue))
        .route("/devices/:id/play-next", post(api::renderers::play_next))
        .route("/devices/:id/ungroup", post(api::renderers::ungroup))
        .route("/group", post(api::renderers::create_group));

    // Art routes are more specific than the raw file route; matchit prefers
    // static segments over the catch-all
    let stream_routes = Router::new()
        .route("/art/embedded/:track_id", get(api::stream::embedded_art))
        .route("/art/*path", get(api::stream::folder_art))
        .route("/*path", get(api::stream::stream_file));

    // Static web frontend (SPA fallback to index.html)
    let web_dir = app_state.config.server.web_dir.clone();
    let static_site = ServeDir::new(&web_dir)
        .not_found_service(ServeFile::new(web_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(api::health::health))
        .nest("/api/library", library_routes)
        .nest("/api/playlists", playlist_routes)
        .nest("/api/renderers", renderer_routes)
        .nest("/stream", stream_routes)
        .fallback_service(static_site)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
