//! HTTP transport implementation.
//!
//! JSON-RPC over POST. The request body is parsed by hand rather than with a
//! typed JSON extractor so that malformed payloads produce a proper
//! `-32700` error envelope instead of a bare transport-level 400.
//!
//! Besides the RPC endpoint the server exposes `/health` (liveness,
//! independent of dispatch), `/` (metadata plus advertised tools),
//! `/toolslist` (raw descriptor array) and `/sse` (a passive side channel
//! mirroring every serialized response as Server-Sent Events).

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use futures::Stream;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::rpc::{RequestId, Response};
use crate::core::server::ToolServer;

/// Capacity of the SSE event buffer. Observers that fall further behind than
/// this lose the oldest events (logged, never an error for the RPC path).
const EVENT_BUFFER: usize = 256;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The dispatch core.
    server: ToolServer,
    /// Side channel carrying every serialized response for SSE observers.
    events: broadcast::Sender<String>,
}

impl AppState {
    /// Build state for a dispatch core.
    pub fn new(server: ToolServer) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self { server, events }
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: ToolServer) -> TransportResult<()> {
        let addr = self.address();
        let state = AppState::new(server);
        let router = app(state, &self.config.rpc_path, self.config.enable_cors);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {} (JSON-RPC over HTTP)", addr);
        info!("  -> JSON-RPC: POST {}", self.config.rpc_path);
        info!("  -> Health:   GET /health");

        axum::serve(listener, router)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router for a tool server.
pub fn app(state: AppState, rpc_path: &str, enable_cors: bool) -> Router {
    let mut router = Router::new()
        .route(rpc_path, post(handle_rpc))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .route("/toolslist", get(tools_list_handler))
        .route("/sse", get(sse_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

/// Root handler - server metadata and the advertised tool list.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.server.metadata())
}

/// Health check endpoint, independent of the dispatch core.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Convenience duplicate of `tools/list`: the raw descriptor array.
async fn tools_list_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::to_value(state.server.descriptors()).unwrap_or_default())
}

/// Handle a JSON-RPC request body.
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let response = match std::str::from_utf8(&body) {
        Ok(payload) => state.server.handle_payload(payload),
        Err(e) => {
            warn!("request body is not UTF-8: {}", e);
            Response::parse_error(RequestId::Absent, format!("Parse error: {e}"))
        }
    };

    // Mirror the response to SSE observers. Failure only means nobody is
    // listening.
    if let Ok(serialized) = serde_json::to_string(&response) {
        let _ = state.events.send(serialized);
    }

    Json(response)
}

/// Stream serialized responses to a passive observer.
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(payload) => return Some((Ok(Event::default().data(payload)), rx)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("sse observer lagged, dropped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;

    async fn spawn_server() -> String {
        let state = AppState::new(ToolServer::new(Config::default()));
        let router = app(state, "/rpc", true);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_health_is_independent_of_dispatch() {
        let base = spawn_server().await;
        let body: serde_json::Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_rpc_tools_list() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();
        let body: serde_json::Value = client
            .post(format!("{base}/rpc"))
            .header("content-type", "application/json")
            .body(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["id"], serde_json::json!(1));
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_rpc_malformed_body_is_parse_error() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();
        let response = client
            .post(format!("{base}/rpc"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        // The transport stays 200; the fault lives in the envelope.
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"]["code"], serde_json::json!(-32700));
    }

    #[tokio::test]
    async fn test_toolslist_is_raw_descriptor_array() {
        let base = spawn_server().await;
        let body: serde_json::Value = reqwest::get(format!("{base}/toolslist"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let tools = body.as_array().unwrap();
        assert_eq!(tools.len(), 4);
        assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
    }

    #[tokio::test]
    async fn test_root_metadata() {
        let base = spawn_server().await;
        let body: serde_json::Value = reqwest::get(&base).await.unwrap().json().await.unwrap();
        assert_eq!(body["name"], "toolbus");
        assert!(body["tools"].as_array().unwrap().contains(&serde_json::json!("format_sql")));
    }
}
