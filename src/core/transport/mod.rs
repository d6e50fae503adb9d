//! Transport layer for the tool server.
//!
//! Two bindings satisfy the same dispatch contract:
//! - **STDIO**: one envelope per line on stdin/stdout, sequential
//! - **HTTP**: JSON-RPC over POST, plus health/metadata/SSE side endpoints
//!
//! Each transport handles the connection lifecycle and delegates message
//! processing to the [`ToolServer`](crate::core::server::ToolServer) core.

mod config;
mod error;
mod service;

pub mod http;
pub mod stdio;

pub use config::{HttpConfig, TransportConfig};
pub use error::{TransportError, TransportResult};
pub use service::TransportService;
