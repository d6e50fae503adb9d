//! Configuration for the tool router.
//!
//! Same conventions as the server configuration: environment variables with
//! the `TOOLBUS_ROUTER_` prefix, defaults everywhere, loaded once at startup.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default timeout for router -> server calls, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration for a router process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Router name, reported by its own `initialize`.
    pub name: String,

    /// Router version.
    pub version: String,

    /// Log level filter.
    pub log_level: String,

    /// Host address for the router's own HTTP surface.
    pub host: String,

    /// Port for the router's own HTTP surface.
    pub port: u16,

    /// Timeout for outbound calls to backend servers, in seconds.
    /// No retry is ever performed.
    pub request_timeout_secs: u64,

    /// The backend servers, in declaration order. Built once at startup and
    /// never mutated.
    pub servers: Vec<ServerEndpoint>,
}

/// One registered backend server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    /// Logical server name, unique within the registry.
    pub name: String,

    /// Base URL, without the `/rpc` suffix.
    pub base_url: String,
}

impl ServerEndpoint {
    /// Create an endpoint, normalizing a trailing slash away.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The RPC endpoint URL for this server.
    pub fn rpc_url(&self) -> String {
        format!("{}/rpc", self.base_url)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            name: "toolbus-router".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8090,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            servers: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    ///
    /// `TOOLBUS_ROUTER_SERVERS` is a comma-separated `name=url` list, e.g.
    /// `formatter=http://127.0.0.1:8081,differ=http://127.0.0.1:8082`.
    /// Declaration order is preserved; it is the aggregation merge order.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("TOOLBUS_ROUTER_NAME") {
            config.name = name;
        }

        if let Ok(level) = std::env::var("TOOLBUS_LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(host) = std::env::var("TOOLBUS_ROUTER_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("TOOLBUS_ROUTER_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }

        if let Ok(secs) = std::env::var("TOOLBUS_ROUTER_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout_secs = secs;
            }
        }

        if let Ok(list) = std::env::var("TOOLBUS_ROUTER_SERVERS") {
            config.servers = parse_server_list(&list);
        } else {
            warn!("TOOLBUS_ROUTER_SERVERS not set - the registry is empty");
        }

        config
    }
}

/// Parse a `name=url,name=url` list, skipping (and logging) malformed
/// entries rather than failing startup over one typo.
fn parse_server_list(list: &str) -> Vec<ServerEndpoint> {
    let mut servers = Vec::new();

    for entry in list.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        match entry.split_once('=') {
            Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => {
                servers.push(ServerEndpoint::new(name.trim(), url.trim()));
            }
            _ => {
                warn!("ignoring malformed server registry entry: {:?}", entry);
            }
        }
    }

    servers
}
