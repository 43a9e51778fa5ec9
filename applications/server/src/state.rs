/// Shared application state
use crate::config::ServerConfig;
use crate::services::renderers::RendererRegistry;
use aria_indexer::Indexer;
use aria_metadata::ArtExtractor;
use sqlx::SqlitePool;
use std::sync::Arc;

/// How many embedded-art images to keep decoded in memory
const ART_CACHE_SIZE: usize = 32;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<ServerConfig>,
    pub indexer: Arc<Indexer>,
    pub renderers: Arc<RendererRegistry>,
    pub artwork: Arc<ArtExtractor>,
    /// Computed once at startup; host-IP detection should not run per request
    pub stream_base_url: Arc<str>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ServerConfig, renderers: Arc<RendererRegistry>) -> Self {
        let stream_base_url: Arc<str> = config.stream_base_url().into();
        let indexer = Arc::new(Indexer::new(pool.clone(), config.library.music_path.clone()));

        Self {
            pool,
            config: Arc::new(config),
            indexer,
            renderers,
            artwork: Arc::new(ArtExtractor::new(ART_CACHE_SIZE)),
            stream_base_url,
        }
    }
}
