//! Transport configuration types.

use serde::{Deserialize, Serialize};

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Line-oriented standard input/output transport (default).
    Stdio,

    /// HTTP transport with JSON-RPC over POST.
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for the JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_path() -> String {
    "/rpc".to_string()
}

fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Stdio
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create an HTTP transport config.
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    ///
    /// `TOOLBUS_TRANSPORT=http` selects HTTP (with `TOOLBUS_HTTP_PORT`,
    /// `TOOLBUS_HTTP_HOST`, `TOOLBUS_HTTP_PATH`, `TOOLBUS_HTTP_CORS`);
    /// anything else selects stdio.
    pub fn from_env() -> Self {
        let transport = std::env::var("TOOLBUS_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            "http" => {
                let port = std::env::var("TOOLBUS_HTTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080);
                let host = std::env::var("TOOLBUS_HTTP_HOST").unwrap_or_else(|_| default_host());
                let rpc_path =
                    std::env::var("TOOLBUS_HTTP_PATH").unwrap_or_else(|_| default_rpc_path());
                let enable_cors = std::env::var("TOOLBUS_HTTP_CORS")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(true);
                Self::Http(HttpConfig {
                    port,
                    host,
                    rpc_path,
                    enable_cors,
                })
            }
            _ => Self::Stdio,
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            Self::Stdio => "STDIO (line-oriented JSON-RPC)".to_string(),
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }

    /// Check if this transport is the stdio mode.
    pub fn is_stdio(&self) -> bool {
        matches!(self, Self::Stdio)
    }
}
