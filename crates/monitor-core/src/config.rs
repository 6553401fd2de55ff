//! Configuration loading and typed config structures for the monitor.
//!
//! Configuration lives in an optional YAML file (`monitor-config.yaml` by
//! default). Every field has a default, so a missing file or an empty one
//! yields a working configuration:
//!
//! ```yaml
//! server:
//!   host: "0.0.0.0"
//!   port: 8080
//!   static_dir: "."
//!   dashboard_file: "monitor.html"
//! state:
//!   message_window: 100
//! logging:
//!   level: "info"
//!   json: false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::store::DEFAULT_MESSAGE_WINDOW;

/// Environment variable overriding `server.host`.
pub const ENV_HOST: &str = "MONITOR_HOST";
/// Environment variable overriding `server.port`.
pub const ENV_PORT: &str = "MONITOR_PORT";
/// Environment variable overriding `server.static_dir`.
pub const ENV_STATIC_DIR: &str = "MONITOR_STATIC_DIR";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {var}: {message}")]
    Env {
        /// The environment variable name.
        var: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitorConfig {
    /// HTTP listener and static file settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// State store sizing.
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load configuration from a YAML file at the given path, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Env`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults.
    /// Environment overrides apply in both cases.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_or_default(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse `path` when it exists, otherwise return the defaults. No
    /// overrides are applied.
    pub fn read_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// An empty document yields the defaults.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override settings from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Override settings from an arbitrary variable lookup.
    ///
    /// - `MONITOR_HOST` overrides `server.host`
    /// - `MONITOR_PORT` overrides `server.port`
    /// - `MONITOR_STATIC_DIR` overrides `server.static_dir`
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|e| ConfigError::Env {
                var: ENV_PORT,
                message: format!("{port:?}: {e}"),
            })?;
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR) {
            self.server.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

/// HTTP listener and static file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for unmatched `GET` paths.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Dashboard document served for `GET /`, relative to `static_dir`.
    #[serde(default = "default_dashboard_file")]
    pub dashboard_file: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            dashboard_file: default_dashboard_file(),
        }
    }
}

/// State store sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateConfig {
    /// Number of recent messages kept for the dashboard animation.
    #[serde(default = "default_message_window")]
    pub message_window: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            message_window: default_message_window(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_dashboard_file() -> String {
    String::from("monitor.html")
}

const fn default_message_window() -> usize {
    DEFAULT_MESSAGE_WINDOW
}

fn default_log_level() -> String {
    String::from("info")
}
