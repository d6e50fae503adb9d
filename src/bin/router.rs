//! Tool router entry point.
//!
//! Loads the server registry from the environment, initializes logging and
//! serves the aggregated catalog over HTTP.

use anyhow::Result;
use tracing::{info, warn};

use toolbus::core::init_logging;
use toolbus::router::{RouterConfig, RouterService, http};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RouterConfig::from_env();

    init_logging(&config.log_level);

    info!("Starting {} v{}", config.name, config.version);

    if config.servers.is_empty() {
        warn!("the server registry is empty - set TOOLBUS_ROUTER_SERVERS");
    } else {
        info!(
            "registry: {}",
            config
                .servers
                .iter()
                .map(|s| format!("{}={}", s.name, s.base_url))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let service = RouterService::new(&config)?;
    let state = http::RouterState::new(service, config.name.clone(), config.version.clone());

    http::run(state, &config.host, config.port).await?;

    info!("Router shutting down");

    Ok(())
}
