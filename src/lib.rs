//! Tool server and tool router over a JSON-RPC envelope.
//!
//! # Architecture
//!
//! - **core**: the JSON-RPC envelope model, the stateless dispatch core and
//!   the transport bindings (line-oriented stdio and HTTP)
//! - **domains**: the tools themselves, behind a registration table built at
//!   startup
//! - **router**: catalog aggregation across many tool servers plus call
//!   forwarding under the `server__tool` naming convention
//!
//! # Example
//!
//! ```rust,no_run
//! use toolbus::core::{Config, ToolServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = ToolServer::new(config.clone());
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;
pub mod router;

// Re-export commonly used types for convenience
pub use crate::core::{Config, Error, Result, ToolServer};
