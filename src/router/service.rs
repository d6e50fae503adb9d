//! The aggregation core.
//!
//! [`RouterService`] presents one catalog across every registered tool
//! server and forwards individual calls. Aggregation is a best-effort
//! snapshot: servers are queried concurrently, results are merged in
//! registry order, and an unreachable backend contributes zero tools and one
//! warning instead of failing the whole round.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::client::RpcClient;
use super::config::RouterConfig;
use super::error::RouterError;
use super::registry::ServerRegistry;
use super::qualify;
use crate::domains::tools::ToolDescriptor;

/// A tool descriptor tagged with its owning server.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedTool {
    /// The owning server's registry name.
    pub server: String,

    /// The descriptor exactly as the server advertised it.
    #[serde(flatten)]
    pub descriptor: ToolDescriptor,
}

impl AggregatedTool {
    /// The descriptor under its flattened `server__tool` name.
    pub fn qualified_descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: qualify(&self.server, &self.descriptor.name),
            description: self.descriptor.description.clone(),
            input_schema: self.descriptor.input_schema.clone(),
        }
    }
}

/// Aggregates tool catalogs and forwards calls to the owning server.
pub struct RouterService {
    registry: ServerRegistry,
    client: RpcClient,
}

impl RouterService {
    /// Build the service from configuration.
    pub fn new(config: &RouterConfig) -> anyhow::Result<Self> {
        let client = RpcClient::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self {
            registry: ServerRegistry::new(config.servers.clone()),
            client,
        })
    }

    /// The backend registry.
    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// Aggregate the advertised tools of every registered server.
    ///
    /// Queries run concurrently; the merge iterates the registry in
    /// declaration order, so the output order is stable regardless of
    /// network completion order. Never fails: a server that is down this
    /// round simply contributes nothing.
    pub async fn all_tools(&self) -> Vec<AggregatedTool> {
        let queries = self
            .registry
            .iter()
            .map(|server| async move { (server, self.client.list_tools(server).await) });

        let results = futures::future::join_all(queries).await;

        let mut tools = Vec::new();
        for (server, result) in results {
            match result {
                Ok(descriptors) => {
                    tools.extend(descriptors.into_iter().map(|descriptor| AggregatedTool {
                        server: server.name.clone(),
                        descriptor,
                    }));
                }
                Err(e) => {
                    warn!("skipping server '{}' during aggregation: {}", server.name, e);
                }
            }
        }

        info!(
            "aggregated {} tools from {} servers",
            tools.len(),
            self.registry.len()
        );
        tools
    }

    /// Forward one tool call to the owning server.
    ///
    /// The server name resolves locally first; only a known server costs a
    /// network round trip. The normalized text result comes back on
    /// success, and every failure is classified by [`RouterError`].
    pub async fn call_tool(
        &self,
        server_name: &str,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<String, RouterError> {
        let server = self.registry.get(server_name)?;
        info!("forwarding {}::{}", server_name, tool);
        self.client.call_tool(server, tool, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::server::ToolServer;
    use crate::core::transport::http::{AppState, app};
    use crate::router::config::ServerEndpoint;

    /// Spawn a real tool server on an ephemeral port; returns its base URL.
    async fn spawn_tool_server(name: &str) -> String {
        let mut config = Config::default();
        config.server.name = name.to_string();
        let state = AppState::new(ToolServer::new(config));
        let router = app(state, "/rpc", false);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Spawn a stub whose /rpc always answers with the given envelope body.
    async fn spawn_stub(reply: serde_json::Value) -> String {
        use axum::{Json, Router, routing::post};
        let router = Router::new().route(
            "/rpc",
            post(move || {
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn service(servers: Vec<ServerEndpoint>) -> RouterService {
        let config = RouterConfig {
            servers,
            request_timeout_secs: 5,
            ..Default::default()
        };
        RouterService::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_aggregation_merges_all_reachable_servers() {
        let first = spawn_tool_server("first").await;
        let second = spawn_tool_server("second").await;

        let service = service(vec![
            ServerEndpoint::new("first", first),
            ServerEndpoint::new("second", second),
        ]);

        let tools = service.all_tools().await;
        assert_eq!(tools.len(), 8); // 4 built-in tools per server

        // Merge order follows the registry, not network completion order.
        assert!(tools[..4].iter().all(|t| t.server == "first"));
        assert!(tools[4..].iter().all(|t| t.server == "second"));
    }

    #[tokio::test]
    async fn test_aggregation_tolerates_unreachable_servers() {
        let live = spawn_tool_server("live").await;

        let service = service(vec![
            ServerEndpoint::new("dead", "http://127.0.0.1:1"),
            ServerEndpoint::new("live", live),
        ]);

        // The dead backend contributes zero tools; nothing propagates.
        let tools = service.all_tools().await;
        assert_eq!(tools.len(), 4);
        assert!(tools.iter().all(|t| t.server == "live"));
    }

    #[tokio::test]
    async fn test_call_tool_end_to_end() {
        let base = spawn_tool_server("fmt").await;
        let service = service(vec![ServerEndpoint::new("fmt", base)]);

        let text = service
            .call_tool("fmt", "format_sql", serde_json::json!({"code": "select 1"}))
            .await
            .unwrap();
        assert_eq!(text, "SELECT 1");
    }

    #[tokio::test]
    async fn test_call_tool_extracts_first_text_block() {
        let base = spawn_stub(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"content": [{"type": "text", "text": "SELECT 1"}]}
        }))
        .await;
        let service = service(vec![ServerEndpoint::new("stub", base)]);

        let text = service
            .call_tool("stub", "format_sql", serde_json::json!({"code": "select 1"}))
            .await
            .unwrap();
        assert_eq!(text, "SELECT 1");
    }

    #[tokio::test]
    async fn test_call_tool_falls_back_to_raw_result() {
        let base = spawn_stub(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"answer": 42}
        }))
        .await;
        let service = service(vec![ServerEndpoint::new("stub", base)]);

        let text = service
            .call_tool("stub", "anything", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(text, r#"{"answer":42}"#);
    }

    #[tokio::test]
    async fn test_call_tool_unknown_server_is_local() {
        let service = service(vec![]);
        let err = service
            .call_tool("ghost", "format_sql", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::UnknownServer { .. }));
    }

    #[tokio::test]
    async fn test_call_tool_propagates_remote_error_verbatim() {
        let base = spawn_stub(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "backend exploded"}
        }))
        .await;
        let service = service(vec![ServerEndpoint::new("stub", base)]);

        let err = service
            .call_tool("stub", "format_sql", serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            RouterError::Remote { code, message, .. } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "backend exploded");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_tool_transport_fault_for_dead_server() {
        let service = service(vec![ServerEndpoint::new("dead", "http://127.0.0.1:1")]);
        let err = service
            .call_tool("dead", "format_sql", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_qualified_descriptor() {
        let base = spawn_tool_server("fmt").await;
        let service = service(vec![ServerEndpoint::new("fmt", base)]);

        let tools = service.all_tools().await;
        let qualified: Vec<String> = tools
            .iter()
            .map(|t| t.qualified_descriptor().name)
            .collect();
        assert!(qualified.contains(&"fmt__format_sql".to_string()));
    }
}
