//! Networked audio renderer control
//!
//! Renderers (networked playback devices) are an external capability with
//! their own failure domain: this module defines the interface the HTTP
//! surface proxies to and an owned registry with explicit refresh and lookup
//! operations. Device protocol backends implement [`RendererControl`] (and
//! optionally [`RendererDiscovery`]) and hand devices to the registry; any
//! backend failure surfaces as the generic [`RendererError::Operation`].

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Renderer failure domain
#[derive(Debug, Error)]
pub enum RendererError {
    /// No device registered under that id
    #[error("renderer not found: {0}")]
    NotFound(String),

    /// The device rejected or failed the operation
    #[error("renderer operation failed: {0}")]
    Operation(String),
}

/// Result type for renderer operations
pub type Result<T> = std::result::Result<T, RendererError>;

/// Snapshot of a device's state
#[derive(Debug, Clone, Serialize)]
pub struct RendererInfo {
    pub id: String,
    pub name: String,
    pub model: Option<String>,
    pub volume: u8,
    pub muted: bool,
    /// Transport state as the device reports it (e.g. PLAYING, PAUSED)
    pub transport_state: String,
    /// Id of the group coordinator when the device plays in a group
    pub group_coordinator: Option<String>,
}

/// What a device is currently playing
#[derive(Debug, Clone, Serialize)]
pub struct NowPlaying {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Playback position in seconds
    pub position: Option<f64>,
    /// Track duration in seconds
    pub duration: Option<f64>,
    pub uri: Option<String>,
}

/// One slot in a device queue
#[derive(Debug, Clone, Serialize)]
pub struct QueueItem {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub uri: String,
}

/// Control operations one renderer device supports.
///
/// Implementations live in protocol backends outside this crate; the server
/// only consumes this interface.
#[async_trait]
pub trait RendererControl: Send + Sync {
    /// Stable device identifier
    fn id(&self) -> &str;

    /// Human-readable device name
    fn name(&self) -> &str;

    /// Current device state snapshot
    async fn describe(&self) -> Result<RendererInfo>;

    /// What the device is playing right now
    async fn now_playing(&self) -> Result<NowPlaying>;

    async fn play(&self) -> Result<()>;
    async fn pause(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn next(&self) -> Result<()>;
    async fn previous(&self) -> Result<()>;

    /// Volume in 0..=100
    async fn set_volume(&self, volume: u8) -> Result<()>;

    /// Toggle mute; returns the new mute state
    async fn toggle_mute(&self) -> Result<bool>;

    /// A window of the device queue
    async fn queue(&self, start: u32, count: u32) -> Result<Vec<QueueItem>>;

    async fn clear_queue(&self) -> Result<()>;

    /// Replace playback with a URI immediately
    async fn play_uri(&self, uri: &str, title: Option<&str>) -> Result<()>;

    /// Append a URI to the queue; `play_next` slots it after the current track
    async fn enqueue_uri(&self, uri: &str, play_next: bool) -> Result<()>;

    /// Join the group coordinated by another device
    async fn join_group(&self, coordinator_id: &str) -> Result<()>;

    /// Leave the current group and play standalone
    async fn leave_group(&self) -> Result<()>;
}

/// Discovers devices on the local network.
#[async_trait]
pub trait RendererDiscovery: Send + Sync {
    async fn discover(&self) -> Result<Vec<Arc<dyn RendererControl>>>;
}

/// Owned device registry with explicit refresh and lookup.
///
/// Replaces ambient global device caches: the server constructs one registry,
/// hands it to the router state, and every handler goes through it.
pub struct RendererRegistry {
    discovery: Option<Arc<dyn RendererDiscovery>>,
    devices: RwLock<HashMap<String, Arc<dyn RendererControl>>>,
}

impl RendererRegistry {
    /// An empty registry; devices arrive via [`register`](Self::register).
    pub fn new() -> Self {
        Self {
            discovery: None,
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// A registry that refreshes itself through a discovery backend.
    pub fn with_discovery(discovery: Arc<dyn RendererDiscovery>) -> Self {
        Self {
            discovery: Some(discovery),
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// Add or replace one device.
    pub fn register(&self, device: Arc<dyn RendererControl>) {
        self.devices
            .write()
            .expect("renderer registry poisoned")
            .insert(device.id().to_string(), device);
    }

    /// Re-run discovery and replace the device set. A registry without a
    /// discovery backend keeps its registered devices. Returns the device
    /// count.
    pub async fn refresh(&self) -> Result<usize> {
        if let Some(ref discovery) = self.discovery {
            let found = discovery.discover().await?;
            let mut devices = self.devices.write().expect("renderer registry poisoned");
            devices.clear();
            for device in found {
                devices.insert(device.id().to_string(), device);
            }
            return Ok(devices.len());
        }

        Ok(self
            .devices
            .read()
            .expect("renderer registry poisoned")
            .len())
    }

    /// All known devices, unordered.
    pub fn list(&self) -> Vec<Arc<dyn RendererControl>> {
        self.devices
            .read()
            .expect("renderer registry poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Look up one device by id.
    pub fn get(&self, id: &str) -> Result<Arc<dyn RendererControl>> {
        self.devices
            .read()
            .expect("renderer registry poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| RendererError::NotFound(id.to_string()))
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}
