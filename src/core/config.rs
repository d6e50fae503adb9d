//! Configuration for the tool server.
//!
//! All settings come from environment variables (prefixed `TOOLBUS_`) with
//! sensible defaults, so the binary runs with no configuration at all. The
//! resulting struct is plain data handed to the components at startup; nothing
//! reads the environment after that.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::transport::TransportConfig;

/// Top-level configuration for a tool server process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// File-system sandbox for the fs tools.
    pub security: SecurityConfig,
}

/// Server identification, reported by `initialize` and the HTTP root handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Sandbox settings for tools that touch the file system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Optional root directory for path operations. When set, every path a
    /// tool receives must resolve to somewhere inside it.
    pub root_path: Option<PathBuf>,

    /// Whether symlinks may be followed during path resolution.
    pub allow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "toolbus".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            security: SecurityConfig {
                root_path: None,
                allow_symlinks: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `TOOLBUS_SERVER_NAME`, `TOOLBUS_LOG_LEVEL`,
    /// `TOOLBUS_TRANSPORT` (plus the transport-specific variables it implies),
    /// `TOOLBUS_ROOT_PATH`, `TOOLBUS_ALLOW_SYMLINKS`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("TOOLBUS_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("TOOLBUS_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Ok(root_path) = std::env::var("TOOLBUS_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
            info!(
                "fs sandbox enabled: root directory {:?}",
                config.security.root_path
            );
        } else {
            warn!("TOOLBUS_ROOT_PATH not set - fs tools may access any path");
        }

        if let Ok(allow_symlinks) = std::env::var("TOOLBUS_ALLOW_SYMLINKS") {
            config.security.allow_symlinks = allow_symlinks.parse().unwrap_or(true);
        }

        config
    }
}

/// Initialize the tracing subscriber.
///
/// Output goes to stderr so the stdio transport keeps stdout protocol-clean.
pub fn init_logging(level: &str) {
    use tracing::Level;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
