//! Tool router: catalog aggregation and call forwarding.
//!
//! The router knows the network location of many tool servers, merges their
//! advertised tool lists into one catalog and forwards qualified calls to the
//! correct backend. It performs no retry, no circuit breaking and no catalog
//! caching: every aggregation is a fresh best-effort snapshot.
//!
//! ## Architecture
//!
//! - `config.rs` - registry configuration from the environment
//! - `registry.rs` - the fixed name -> endpoint mapping
//! - `client.rs` - JSON-RPC over HTTP to the backends
//! - `service.rs` - aggregation and forwarding
//! - `http.rs` - the router's own RPC surface

pub mod config;
pub mod http;

mod client;
mod error;
mod registry;
mod service;

pub use config::{RouterConfig, ServerEndpoint};
pub use error::RouterError;
pub use registry::ServerRegistry;
pub use service::{AggregatedTool, RouterService};

/// Separator of the `server__tool` qualified-name convention.
pub const QUALIFIER: &str = "__";

/// Flatten a `(server, tool)` pair into one qualified name.
pub fn qualify(server: &str, tool: &str) -> String {
    format!("{server}{QUALIFIER}{tool}")
}

/// Split a qualified name back into `(server, tool)`.
///
/// Splits at the first `__`, so tool names may themselves contain double
/// underscores; server names may not. Returns `None` when either half would
/// be empty.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    let (server, tool) = name.split_once(QUALIFIER)?;
    if server.is_empty() || tool.is_empty() {
        return None;
    }
    Some((server, tool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_round_trip() {
        let name = qualify("formatter", "format_sql");
        assert_eq!(name, "formatter__format_sql");
        assert_eq!(split_qualified(&name), Some(("formatter", "format_sql")));
    }

    #[test]
    fn test_split_at_first_separator() {
        assert_eq!(split_qualified("a__b__c"), Some(("a", "b__c")));
    }

    #[test]
    fn test_split_rejects_unqualified_names() {
        assert_eq!(split_qualified("format_sql"), None);
        assert_eq!(split_qualified("__tool"), None);
        assert_eq!(split_qualified("server__"), None);
    }
}
