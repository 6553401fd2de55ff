//! State aggregation and configuration for the pipeline monitor.
//!
//! # Modules
//!
//! - [`store`] -- The authoritative in-memory [`StateStore`] and its event
//!   folds. Pure data; no I/O.
//! - [`config`] -- Typed YAML configuration with environment overrides.

pub mod config;
pub mod store;

pub use config::{ConfigError, MonitorConfig};
pub use store::{Applied, DEFAULT_MESSAGE_WINDOW, StateStore};
