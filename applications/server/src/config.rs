/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_stream")]
    pub stream: StreamSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the static web frontend
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Root of the music tree the indexer walks and streaming serves from
    #[serde(default = "default_music_path")]
    pub music_path: PathBuf,

    /// Data root: the SQLite catalog and saved playlists live here
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Kick off an indexing run when the server starts
    #[serde(default = "default_index_on_startup")]
    pub index_on_startup: bool,

    /// Override the derived sqlite:// URL (mainly for tests)
    #[serde(default)]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamSettings {
    /// IP renderers use to reach this server; "auto" detects the outbound
    /// interface address
    #[serde(default = "default_host_ip")]
    pub host_ip: String,
}

impl ServerConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        // Load from config file if it exists
        let config_path = PathBuf::from("config.toml");
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        // Override with environment variables (prefixed with ARIA_)
        settings = settings.add_source(
            config::Environment::with_prefix("ARIA")
                .separator("_")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// SQLite connection URL, derived from the data root unless overridden
    pub fn database_url(&self) -> String {
        if self.library.database_url.is_empty() {
            format!(
                "sqlite://{}",
                self.library.data_path.join("library.db").display()
            )
        } else {
            self.library.database_url.clone()
        }
    }

    /// Directory where playlists are exported as M3U files
    pub fn playlists_dir(&self) -> PathBuf {
        self.library.data_path.join("playlists")
    }

    /// Base URL renderers and clients stream from, e.g. `http://10.0.0.5:8000`
    pub fn stream_base_url(&self) -> String {
        let host_ip = if self.stream.host_ip == "auto" {
            detect_host_ip()
        } else {
            self.stream.host_ip.clone()
        };
        format!("http://{}:{}", host_ip, self.server.port)
    }
}

/// Detect the outbound interface address (the IP a renderer on the local
/// network can reach us at). No packet is sent; connect() on a UDP socket
/// just picks the route.
fn detect_host_ip() -> String {
    let detected = std::net::UdpSocket::bind("0.0.0.0:0").and_then(|socket| {
        socket.connect("8.8.8.8:80")?;
        socket.local_addr()
    });

    match detected {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => "127.0.0.1".to_string(),
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
        web_dir: default_web_dir(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("./web")
}

fn default_library() -> LibrarySettings {
    LibrarySettings {
        music_path: default_music_path(),
        data_path: default_data_path(),
        index_on_startup: default_index_on_startup(),
        database_url: String::new(),
    }
}

fn default_music_path() -> PathBuf {
    PathBuf::from("/music")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("/data")
}

fn default_index_on_startup() -> bool {
    true
}

fn default_stream() -> StreamSettings {
    StreamSettings {
        host_ip: default_host_ip(),
    }
}

fn default_host_ip() -> String {
    "auto".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            library: default_library(),
            stream: default_stream(),
        }
    }
}
