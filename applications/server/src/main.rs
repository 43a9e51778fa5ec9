/// Aria Server - local music streaming server
use aria_server::{
    config::ServerConfig, create_router, services::renderers::RendererRegistry, state::AppState,
};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aria-server")]
#[command(about = "Aria local music streaming server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Run one indexing pass in the foreground and exit
    Index,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aria_server=info,aria_indexer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve().await?,
        Commands::Index => index().await?,
    }

    Ok(())
}

async fn build_state() -> anyhow::Result<AppState> {
    let config = ServerConfig::load()?;

    // The SQLite file lives under the data root
    tokio::fs::create_dir_all(&config.library.data_path).await?;

    let pool = aria_storage::create_pool(&config.database_url()).await?;
    aria_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let renderers = Arc::new(RendererRegistry::new());

    Ok(AppState::new(pool, config, renderers))
}

async fn serve() -> anyhow::Result<()> {
    let app_state = build_state().await?;
    let config = Arc::clone(&app_state.config);

    tracing::info!("Starting Aria Server");
    tracing::info!("Library root: {}", config.library.music_path.display());
    tracing::info!("Stream base URL: {}", app_state.stream_base_url);

    if config.library.index_on_startup
        && Arc::clone(&app_state.indexer).start(false).await?
    {
        tracing::info!("Startup indexing run triggered");
    }

    let app = create_router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> anyhow::Result<()> {
    let app_state = build_state().await?;

    tracing::info!(
        "Indexing {}",
        app_state.config.library.music_path.display()
    );
    app_state.indexer.run().await;

    let status = aria_storage::index_status::latest(&app_state.pool).await?;
    if let Some(status) = status {
        tracing::info!(
            "Run finished: {} ({}/{} files)",
            status.state.as_str(),
            status.processed_files,
            status.total_files
        );
    }

    Ok(())
}
