//! HTTP client for router -> server calls.
//!
//! One envelope per `POST {base_url}/rpc`. Calls carry a fixed timeout and
//! are never retried; every failure mode is classified by
//! [`RouterError`](super::error::RouterError) so callers can tell a dead
//! backend from a backend that answered with a tool error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use super::config::ServerEndpoint;
use super::error::RouterError;
use crate::core::rpc::{Request, Response};
use crate::domains::tools::ToolDescriptor;

/// Process-wide monotonic request id counter.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique outbound request id.
fn next_request_id() -> i64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed) as i64
}

/// JSON-RPC client over HTTP.
pub struct RpcClient {
    http: reqwest::Client,
}

impl RpcClient {
    /// Build a client with the given per-call timeout.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("toolbus-router/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Send one envelope and parse the reply envelope.
    ///
    /// Network errors, non-success statuses and non-JSON bodies are all
    /// transport faults.
    pub async fn request(
        &self,
        server: &ServerEndpoint,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<Response, RouterError> {
        let request = Request::new(next_request_id(), method, params);
        debug!("-> {} {} ({})", server.name, method, server.rpc_url());

        let reply = self
            .http
            .post(server.rpc_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| RouterError::transport(&server.name, e))?;

        let status = reply.status();
        if !status.is_success() {
            return Err(RouterError::transport(
                &server.name,
                format!("HTTP status {status}"),
            ));
        }

        reply
            .json::<Response>()
            .await
            .map_err(|e| RouterError::transport(&server.name, format!("non-JSON reply: {e}")))
    }

    /// Fetch the tool descriptors a server advertises.
    pub async fn list_tools(
        &self,
        server: &ServerEndpoint,
    ) -> Result<Vec<ToolDescriptor>, RouterError> {
        let response = self.request(server, "tools/list", None).await?;

        if let Some(error) = response.error {
            return Err(RouterError::Remote {
                server: server.name.clone(),
                tool: "tools/list".to_string(),
                code: error.code,
                message: error.message,
            });
        }

        let result = response.result.ok_or_else(|| {
            RouterError::invalid_response(&server.name, "reply has neither result nor error")
        })?;

        let tools = result.get("tools").cloned().ok_or_else(|| {
            RouterError::invalid_response(&server.name, "tools/list result has no 'tools' member")
        })?;

        serde_json::from_value(tools)
            .map_err(|e| RouterError::invalid_response(&server.name, e.to_string()))
    }

    /// Invoke one tool on a server and normalize the result to text.
    ///
    /// Tool outputs are conventionally wrapped as
    /// `{content: [{type: "text", text: ...}]}`; servers that skip the
    /// wrapping still work - the raw serialized result is returned instead.
    pub async fn call_tool(
        &self,
        server: &ServerEndpoint,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<String, RouterError> {
        let params = serde_json::json!({
            "name": tool,
            "arguments": arguments,
        });

        let response = self.request(server, "tools/call", Some(params)).await?;

        if let Some(error) = response.error {
            return Err(RouterError::Remote {
                server: server.name.clone(),
                tool: tool.to_string(),
                code: error.code,
                message: error.message,
            });
        }

        let result = response.result.ok_or_else(|| {
            RouterError::invalid_response(&server.name, "reply has neither result nor error")
        })?;

        Ok(extract_text(&result))
    }
}

/// Pull the first text block out of a wrapped tool result, or fall back to
/// the raw serialized result.
fn extract_text(result: &serde_json::Value) -> String {
    if let Some(text) = result
        .get("content")
        .and_then(|c| c.get(0))
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
    {
        return text.to_string();
    }

    result.to_string()
}
