//! Pipeline monitor binary.
//!
//! Wires configuration, logging, the state store, and the reporting server
//! together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration (file, then environment, then CLI overrides)
//! 3. Initialize structured logging (tracing)
//! 4. Create the state store and application state
//! 5. Bind the listener and print the startup banner
//! 6. Serve until shutdown

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use monitor_core::{MonitorConfig, StateStore};
use monitor_observer::{AppState, ServerConfig, StaticAssets};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::MonitorError;

/// Visualization backend for the producer/consumer/broker demo.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "monitor-config.yaml")]
    config: PathBuf,

    /// Port to listen on (overrides config and `MONITOR_PORT`)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the dashboard and its assets
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Port to listen on, as a bare argument
    #[arg(value_name = "PORT", conflicts_with = "port")]
    listen_port: Option<u16>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(port) = self.port.or(self.listen_port) {
            config.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir.clone_from(dir);
        }
    }
}

/// Application entry point for the monitor.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the server
/// cannot bind.
#[tokio::main]
async fn main() -> Result<(), MonitorError> {
    // 1. Parse arguments.
    let cli = Cli::parse();

    // 2. Load configuration.
    let config_found = cli.config.exists();
    let mut config = MonitorConfig::load_or_default(&cli.config)?;
    cli.apply(&mut config);

    // 3. Initialize structured logging.
    init_logging(&config);

    info!("monitor-server starting");
    info!(
        path = %cli.config.display(),
        found = config_found,
        host = config.server.host,
        port = config.server.port,
        static_dir = %config.server.static_dir.display(),
        message_window = config.state.message_window,
        "Configuration loaded"
    );

    // 4. Create application state.
    let store = StateStore::with_window(config.state.message_window);
    let assets = StaticAssets {
        root: config.server.static_dir.clone(),
        dashboard_file: config.server.dashboard_file.clone(),
    };
    let state = Arc::new(AppState::with_store(store, assets));

    // 5. Bind and announce.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let listener = monitor_observer::bind(&server_config).await?;
    let port = listener
        .local_addr()
        .map_or(server_config.port, |addr| addr.port());

    info!("Monitor server running on http://localhost:{port}");
    info!("Open http://localhost:{port} in your browser to view the visualization");
    info!("Press Ctrl+C to stop");

    // 6. Serve until Ctrl-C.
    monitor_observer::serve(listener, state, monitor_observer::shutdown_signal()).await?;

    info!("monitor-server stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn init_logging(config: &MonitorConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_config_untouched() {
        let cli = Cli::parse_from(["monitor-server"]);
        let mut config = MonitorConfig::default();
        cli.apply(&mut config);

        assert_eq!(cli.config, PathBuf::from("monitor-config.yaml"));
        assert_eq!(config, MonitorConfig::default());
    }

    #[test]
    fn port_flag_overrides_config() {
        let cli = Cli::parse_from(["monitor-server", "--port", "9001", "--static-dir", "web"]);
        let mut config = MonitorConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.static_dir, PathBuf::from("web"));
    }

    #[test]
    fn bare_port_argument_is_accepted() {
        let cli = Cli::parse_from(["monitor-server", "9002"]);
        let mut config = MonitorConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.server.port, 9002);
    }

    #[test]
    fn port_flag_and_bare_port_conflict() {
        let result = Cli::try_parse_from(["monitor-server", "--port", "1", "2"]);
        assert!(result.is_err());
    }
}
