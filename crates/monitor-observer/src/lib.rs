//! Reporting API server for the pipeline monitor.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Ingestion** (`POST /update`) where the broker, producers, and
//!   consumers report connection and message events
//! - **Status** (`GET /status`) returning the full aggregate state as JSON
//!   for the dashboard to poll
//! - **Dashboard** (`GET /`) serving the dashboard document, with a built-in
//!   status page when none is installed
//! - **Static files** for every other `GET` path
//! - **`WebSocket` endpoint** (`/ws/events`) relaying each applied event
//!   via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! All state lives in a [`StateStore`] owned by [`AppState`] behind a
//! read-write lock. Every ingested event takes the write lock for one fold,
//! so events apply in arrival order; status reads share the read lock and
//! always see a whole, consistent snapshot.
//!
//! [`StateStore`]: monitor_core::StateStore

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve, shutdown_signal};
pub use state::{AppState, StaticAssets};
