//! Tool server entry point.
//!
//! Loads configuration from the environment, initializes logging and serves
//! the tool catalog over the configured transport.

use anyhow::Result;
use tracing::info;

use toolbus::core::{Config, ToolServer, TransportService, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = ToolServer::new(config.clone());

    info!("Server initialized with {} tools", server.descriptors().len());

    let transport = TransportService::new(config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}
