//! The router's own HTTP surface.
//!
//! The router speaks the same envelope dialect as the servers it fronts:
//! `tools/list` returns the aggregated catalog flattened under qualified
//! `server__tool` names, and `tools/call` splits the qualified name back
//! apart and forwards to the owning backend. Callers therefore cannot tell a
//! router from a plain tool server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::service::RouterService;
use super::split_qualified;
use crate::core::rpc::{self, Request, RequestId, Response};
use crate::core::transport::{TransportError, TransportResult};

/// Protocol revision reported by `initialize`.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Shared state for the router's HTTP handlers.
#[derive(Clone)]
pub struct RouterState {
    service: Arc<RouterService>,
    name: String,
    version: String,
}

impl RouterState {
    /// Build state around an aggregation service.
    pub fn new(service: RouterService, name: String, version: String) -> Self {
        Self {
            service: Arc::new(service),
            name,
            version,
        }
    }
}

/// Serve the router surface on the given address until shutdown.
pub async fn run(state: RouterState, host: &str, port: u16) -> TransportResult<()> {
    let addr = format!("{host}:{port}");
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TransportError::bind(&addr, e))?;

    info!("Router ready - listening on {} (JSON-RPC over HTTP)", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| TransportError::http(e.to_string()))?;

    Ok(())
}

/// Build the axum router for the router surface.
pub fn app(state: RouterState) -> Router {
    Router::new()
        .route("/rpc", post(handle_rpc))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn root_handler(State(state): State<RouterState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.name,
        "version": state.version,
        "protocol": "JSON-RPC 2.0",
        "role": "router",
        "servers": state.service.registry().names(),
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn handle_rpc(State(state): State<RouterState>, body: Bytes) -> impl IntoResponse {
    let response = match std::str::from_utf8(&body) {
        Ok(payload) => dispatch_payload(&state, payload).await,
        Err(e) => Response::parse_error(RequestId::Absent, format!("Parse error: {e}")),
    };

    Json(response)
}

/// Dispatch one raw payload against the router surface.
async fn dispatch_payload(state: &RouterState, payload: &str) -> Response {
    let request = match serde_json::from_str::<Request>(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!("unparsable request payload: {}", e);
            return Response::parse_error(
                RequestId::recover(payload),
                format!("Parse error: {e}"),
            );
        }
    };

    if request.jsonrpc != "2.0" {
        return Response::error(
            request.id,
            rpc::INVALID_REQUEST,
            format!("unsupported jsonrpc version: {:?}", request.jsonrpc),
        );
    }

    match request.method.as_str() {
        "initialize" => Response::success(
            request.id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": state.name,
                    "version": state.version,
                },
            }),
        ),
        "tools/list" => handle_tools_list(state, request.id).await,
        "tools/call" => handle_tools_call(state, request.id, request.params).await,
        other => Response::method_not_found(request.id, other),
    }
}

/// Aggregate every backend's catalog under qualified names.
async fn handle_tools_list(state: &RouterState, id: RequestId) -> Response {
    let tools: Vec<_> = state
        .service
        .all_tools()
        .await
        .iter()
        .map(|t| t.qualified_descriptor())
        .collect();

    Response::success(id, serde_json::json!({ "tools": tools }))
}

/// Split the qualified name and forward the call to the owning backend.
async fn handle_tools_call(
    state: &RouterState,
    id: RequestId,
    params: Option<serde_json::Value>,
) -> Response {
    let Some(params) = params else {
        return Response::invalid_params(id, "missing params");
    };

    let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
        return Response::invalid_params(id, "missing tool name");
    };

    let Some((server, tool)) = split_qualified(name) else {
        return Response::tool_error(
            id,
            format!("not a qualified tool name (expected server__tool): {name}"),
        );
    };

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));

    match state.service.call_tool(server, tool, arguments).await {
        Ok(text) => Response::success(
            id,
            serde_json::json!({
                "content": [{ "type": "text", "text": text }],
            }),
        ),
        Err(e) => Response::error(id, e.rpc_code(), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::server::ToolServer;
    use crate::core::transport::http::{AppState, app as server_app};
    use crate::router::config::{RouterConfig, ServerEndpoint};

    async fn spawn_tool_server() -> String {
        let state = AppState::new(ToolServer::new(Config::default()));
        let router = server_app(state, "/rpc", false);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn router_state(servers: Vec<ServerEndpoint>) -> RouterState {
        let config = RouterConfig {
            servers,
            request_timeout_secs: 5,
            ..Default::default()
        };
        RouterState::new(
            RouterService::new(&config).unwrap(),
            config.name.clone(),
            config.version.clone(),
        )
    }

    async fn rpc(state: RouterState, payload: &str) -> Response {
        dispatch_payload(&state, payload).await
    }

    #[tokio::test]
    async fn test_router_tools_list_uses_qualified_names() {
        let backend = spawn_tool_server().await;
        let state = router_state(vec![ServerEndpoint::new("fmt", backend)]).await;

        let resp = rpc(state, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 4);
        assert!(
            tools
                .iter()
                .any(|t| t["name"] == serde_json::json!("fmt__format_sql"))
        );
    }

    #[tokio::test]
    async fn test_router_forwards_qualified_call() {
        let backend = spawn_tool_server().await;
        let state = router_state(vec![ServerEndpoint::new("fmt", backend)]).await;

        let resp = rpc(
            state,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"fmt__format_sql","arguments":{"code":"select 1"}}}"#,
        )
        .await;
        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap()["content"][0]["text"], "SELECT 1");
    }

    #[tokio::test]
    async fn test_router_rejects_unqualified_name() {
        let state = router_state(vec![]).await;
        let resp = rpc(
            state,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"format_sql","arguments":{}}}"#,
        )
        .await;
        assert_eq!(resp.error.unwrap().code, rpc::TOOL_ERROR);
    }

    #[tokio::test]
    async fn test_router_unknown_server_surfaces_as_tool_error() {
        let state = router_state(vec![]).await;
        let resp = rpc(
            state,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"ghost__x","arguments":{}}}"#,
        )
        .await;
        let error = resp.error.unwrap();
        assert_eq!(error.code, rpc::TOOL_ERROR);
        assert!(error.message.contains("ghost"));
    }

    #[tokio::test]
    async fn test_router_propagates_backend_error_message() {
        let backend = spawn_tool_server().await;
        let state = router_state(vec![ServerEndpoint::new("fmt", backend)]).await;

        // Unknown tool on the backend; its message travels through the router.
        let resp = rpc(
            state,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"fmt__mystery","arguments":{}}}"#,
        )
        .await;
        let error = resp.error.unwrap();
        assert_eq!(error.code, rpc::TOOL_ERROR);
        assert!(error.message.contains("mystery"));
    }

    #[tokio::test]
    async fn test_router_parse_error() {
        let state = router_state(vec![]).await;
        let resp = rpc(state, "{garbage").await;
        assert_eq!(resp.error.unwrap().code, rpc::PARSE_ERROR);
    }
}
