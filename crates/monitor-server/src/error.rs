//! Error types for the monitor binary.
//!
//! [`MonitorError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the monitor binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: monitor_core::ConfigError,
    },

    /// The reporting server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: monitor_observer::ServerError,
    },
}
