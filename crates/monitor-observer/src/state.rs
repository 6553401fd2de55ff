//! Shared application state for the reporting API server.
//!
//! [`AppState`] owns the [`StateStore`], the broadcast channel that relays
//! applied events to `WebSocket` subscribers, and the location of the
//! dashboard's static files. Each instance is independent, so tests build a
//! fresh one per case.

use std::path::PathBuf;
use std::sync::Arc;

use monitor_core::{Applied, StateStore};
use monitor_types::{MonitorEvent, SystemState};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

/// Capacity of the broadcast channel for applied events.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Where the dashboard and its assets are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAssets {
    /// Directory served for unmatched `GET` paths.
    pub root: PathBuf,
    /// Dashboard document for `GET /`, relative to `root`.
    pub dashboard_file: String,
}

impl StaticAssets {
    /// Full path of the dashboard document.
    pub fn dashboard_path(&self) -> PathBuf {
        self.root.join(&self.dashboard_file)
    }
}

impl Default for StaticAssets {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dashboard_file: String::from("monitor.html"),
        }
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for applied events.
    pub tx: broadcast::Sender<MonitorEvent>,
    /// The aggregate state. Writers take the write lock for one fold.
    pub store: Arc<RwLock<StateStore>>,
    /// Static file locations.
    pub assets: StaticAssets,
}

impl AppState {
    /// Create application state with an empty default store and the
    /// current directory as the static root.
    pub fn new() -> Self {
        Self::with_store(StateStore::new(), StaticAssets::default())
    }

    /// Create application state around an existing store.
    pub fn with_store(store: StateStore, assets: StaticAssets) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            store: Arc::new(RwLock::new(store)),
            assets,
        }
    }

    /// Fold one event into the store and relay it if it changed anything.
    ///
    /// The relay happens under the write lock, so subscribers see events in
    /// the order they were folded.
    pub async fn apply(&self, event: &MonitorEvent) -> Applied {
        let mut store = self.store.write().await;
        let applied = store.apply(event);
        if applied == Applied::Changed {
            let receivers = self.broadcast(event);
            debug!(event = event.kind(), receivers, "Event applied");
        } else {
            debug!(event = event.kind(), "Event ignored");
        }
        drop(store);
        applied
    }

    /// Owned copy of the current aggregate state.
    pub async fn snapshot(&self) -> SystemState {
        self.store.read().await.snapshot()
    }

    /// Subscribe to the applied-event broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, event: &MonitorEvent) -> usize {
        self.tx.send(event.clone()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
