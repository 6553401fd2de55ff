//! Shared type definitions for the pipeline monitor.
//!
//! This crate is the single source of truth for the JSON shapes exchanged
//! with the outside world: the aggregate [`SystemState`] served to the
//! dashboard, and the [`MonitorEvent`] reports pushed by the broker,
//! producers, and consumers. State types flow downstream to `TypeScript`
//! via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`model`] -- Endpoint, broker, message, and aggregate state records
//! - [`events`] -- Closed event enum decoded from `/update` bodies

pub mod events;
pub mod model;

// Re-export all public types at crate root for convenience.
pub use events::{DecodeError, MonitorEvent};
pub use model::{
    BrokerStatus, DEFAULT_FROM, DEFAULT_TO, Endpoint, MessageEvent, SystemState,
    default_timestamp,
};
