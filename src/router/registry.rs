//! The server registry: a fixed name -> endpoint mapping.
//!
//! Populated once at process start from configuration and read-only for the
//! process lifetime; its declaration order is the stable merge order during
//! aggregation.

use super::config::ServerEndpoint;
use super::error::RouterError;

/// Read-only registry of backend tool servers.
#[derive(Debug, Clone)]
pub struct ServerRegistry {
    servers: Vec<ServerEndpoint>,
}

impl ServerRegistry {
    /// Build a registry from endpoints, keeping their order.
    pub fn new(servers: Vec<ServerEndpoint>) -> Self {
        Self { servers }
    }

    /// Resolve a server by name. Purely local; never touches the network.
    pub fn get(&self, name: &str) -> Result<&ServerEndpoint, RouterError> {
        self.servers
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RouterError::unknown_server(name))
    }

    /// Iterate the endpoints in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ServerEndpoint> {
        self.servers.iter()
    }

    /// Registered server names, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.servers.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of registered servers.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
