//! The tool server dispatch core.
//!
//! [`ToolServer`] resolves one request envelope into one response envelope.
//! There is no session or connection state: every call is dispatched
//! independently, and both transports (stdio and HTTP) drive this same core.
//!
//! Faults never escape as panics; they are converted into error envelopes at
//! this boundary so a malformed or failing request cannot take the process
//! down.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::config::Config;
use super::rpc::{self, Request, RequestId, Response};
use crate::domains::tools::ToolRegistry;

/// Protocol revision reported by `initialize`.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// The dispatch core shared by all transports.
#[derive(Clone)]
pub struct ToolServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The tool dispatch table, read-only after construction.
    registry: Arc<ToolRegistry>,
}

impl ToolServer {
    /// Create a server with the built-in tool set.
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, ToolRegistry::with_defaults())
    }

    /// Create a server with an explicit registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The advertised tool descriptors, in stable order.
    pub fn descriptors(&self) -> Vec<&crate::domains::tools::ToolDescriptor> {
        self.registry.descriptors()
    }

    /// Server metadata for the HTTP root handler.
    pub fn metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name(),
            "version": self.version(),
            "protocol": "JSON-RPC 2.0",
            "tools": self.registry.tool_names(),
        })
    }

    /// Dispatch a raw payload (one stdio line or one HTTP body).
    ///
    /// A payload that does not parse as a request envelope yields a parse
    /// error response, correlated with the request id when one can still be
    /// dug out of the malformed JSON.
    pub fn handle_payload(&self, payload: &str) -> Response {
        match serde_json::from_str::<Request>(payload) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!("unparsable request payload: {}", e);
                Response::parse_error(RequestId::recover(payload), format!("Parse error: {e}"))
            }
        }
    }

    /// Dispatch one parsed request envelope.
    #[instrument(skip_all, fields(method = %request.method))]
    pub fn handle(&self, request: Request) -> Response {
        if request.jsonrpc != "2.0" {
            return Response::error(
                request.id,
                rpc::INVALID_REQUEST,
                format!("unsupported jsonrpc version: {:?}", request.jsonrpc),
            );
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params),
            other => {
                warn!("unknown method: {}", other);
                Response::method_not_found(request.id, other)
            }
        }
    }

    fn handle_initialize(&self, id: RequestId) -> Response {
        info!("initialize from client");
        Response::success(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": self.name(),
                    "version": self.version(),
                },
            }),
        )
    }

    fn handle_tools_list(&self, id: RequestId) -> Response {
        Response::success(
            id,
            serde_json::json!({ "tools": self.registry.descriptors() }),
        )
    }

    fn handle_tools_call(&self, id: RequestId, params: Option<serde_json::Value>) -> Response {
        let Some(params) = params else {
            return Response::invalid_params(id, "missing params");
        };

        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return Response::invalid_params(id, "missing tool name");
        };

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));

        info!("tools/call: {}", name);

        match self.registry.call(name, &arguments, &self.config) {
            Ok(result) => {
                // Tool output is wrapped as a single text content block;
                // strings pass through, other values are serialized.
                let text = match result {
                    serde_json::Value::String(s) => s,
                    other => match serde_json::to_string(&other) {
                        Ok(s) => s,
                        Err(e) => return Response::internal_error(id, e.to_string()),
                    },
                };
                Response::success(
                    id,
                    serde_json::json!({
                        "content": [{ "type": "text", "text": text }],
                    }),
                )
            }
            Err(e) => Response::error(id, e.rpc_code(), e.to_string()),
        }
    }
}
