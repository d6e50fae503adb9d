//! Transport service - selects and runs the configured transport.

use tracing::info;

use super::{TransportConfig, TransportResult};
use super::http::HttpTransport;
use super::stdio::StdioTransport;
use crate::core::server::ToolServer;

/// Transport service - manages the transport layer for the tool server.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    /// Create a new transport service with the given configuration.
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Create a transport service from environment variables.
    pub fn from_env() -> Self {
        Self::new(TransportConfig::from_env())
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Start the transport with the given server.
    ///
    /// This method blocks until the transport is shut down.
    pub async fn run(self, server: ToolServer) -> TransportResult<()> {
        info!("Starting transport: {}", self.config.description());

        match self.config {
            TransportConfig::Stdio => StdioTransport::run(server).await,
            TransportConfig::Http(cfg) => HttpTransport::new(cfg).run(server).await,
        }
    }
}
