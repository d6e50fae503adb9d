//! JSON-RPC 2.0 envelope types.
//!
//! Both transports (stdio and HTTP) and the router client exchange the same
//! request/response envelopes defined here. The correlation id is opaque: it
//! is echoed back exactly as received, and an absent id is kept distinct from
//! an explicit `null`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Parse error: the payload was not valid JSON.
pub const PARSE_ERROR: i64 = -32700;
/// The request envelope was structurally invalid.
pub const INVALID_REQUEST: i64 = -32600;
/// The top-level method is not known to this server.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// A required parameter was missing or of the wrong kind.
pub const INVALID_PARAMS: i64 = -32602;
/// Unexpected server-side failure.
pub const INTERNAL_ERROR: i64 = -32603;
/// Application-defined tool error (unknown tool, failed execution).
pub const TOOL_ERROR: i64 = -32000;

/// Opaque correlation id.
///
/// JSON-RPC allows the id to be any JSON value, to be `null`, or to be left
/// out entirely. Callers must not conflate the last two, so the three cases
/// are modeled explicitly instead of as `Option<Value>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestId {
    /// No `id` member was present in the envelope.
    #[default]
    Absent,
    /// The envelope carried an explicit `"id": null`.
    Null,
    /// Any other JSON value (number, string, ...), echoed verbatim.
    Value(serde_json::Value),
}

impl RequestId {
    /// Whether the id member should be omitted during serialization.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Best-effort recovery of an id from a payload that failed envelope
    /// parsing, so a parse error can still be correlated by the caller.
    pub fn recover(payload: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(serde_json::Value::Object(map)) => match map.get("id") {
                None => Self::Absent,
                Some(serde_json::Value::Null) => Self::Null,
                Some(v) => Self::Value(v.clone()),
            },
            _ => Self::Absent,
        }
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Absent is normally skipped at the field level; if it is
            // serialized anyway, null is the only faithful rendering.
            Self::Absent | Self::Null => serializer.serialize_unit(),
            Self::Value(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only reached when the `id` member is present; an absent member
        // falls back to `Default` via `#[serde(default)]` on the field.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Ok(Self::Null),
            v => Ok(Self::Value(v)),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Value(serde_json::Value::from(n))
    }
}

/// JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "RequestId::is_absent")]
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Request {
    /// Build a request with the given id, method and params.
    pub fn new(
        id: impl Into<RequestId>,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response envelope. Exactly one of `result`/`error` is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "RequestId::is_absent")]
    pub id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    /// Create a success response.
    pub fn success(id: RequestId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: RequestId, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Parse error (`-32700`).
    pub fn parse_error(id: RequestId, msg: impl Into<String>) -> Self {
        Self::error(id, PARSE_ERROR, msg)
    }

    /// Method not found error (`-32601`).
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::error(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Invalid params error (`-32602`).
    pub fn invalid_params(id: RequestId, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_PARAMS, msg)
    }

    /// Internal error (`-32603`).
    pub fn internal_error(id: RequestId, msg: impl Into<String>) -> Self {
        Self::error(id, INTERNAL_ERROR, msg)
    }

    /// Application-defined tool error (`-32000`).
    pub fn tool_error(id: RequestId, msg: impl Into<String>) -> Self {
        Self::error(id, TOOL_ERROR, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_absent_round_trip() {
        let req: Request = serde_json::from_str(r#"{"jsonrpc":"2.0","method":"tools/list"}"#)
            .expect("valid envelope");
        assert_eq!(req.id, RequestId::Absent);

        let out = serde_json::to_string(&req).unwrap();
        assert!(!out.contains("\"id\""));
    }

    #[test]
    fn test_request_id_null_round_trip() {
        let req: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"tools/list"}"#)
                .expect("valid envelope");
        assert_eq!(req.id, RequestId::Null);

        let out = serde_json::to_string(&req).unwrap();
        assert!(out.contains("\"id\":null"));
    }

    #[test]
    fn test_request_id_value_preserved() {
        let req: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":42,"method":"initialize"}"#).unwrap();
        assert_eq!(req.id, RequestId::Value(serde_json::json!(42)));

        let resp = Response::success(req.id.clone(), serde_json::json!({}));
        let out = serde_json::to_value(&resp).unwrap();
        assert_eq!(out["id"], serde_json::json!(42));
    }

    #[test]
    fn test_string_id_round_trip() {
        let req: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"abc-1","method":"initialize"}"#)
                .unwrap();
        assert_eq!(req.id, RequestId::Value(serde_json::json!("abc-1")));
    }

    #[test]
    fn test_success_has_no_error_member() {
        let resp = Response::success(RequestId::from(1), serde_json::json!({"ok": true}));
        let out = serde_json::to_value(&resp).unwrap();
        assert!(out.get("result").is_some());
        assert!(out.get("error").is_none());
    }

    #[test]
    fn test_error_has_no_result_member() {
        let resp = Response::method_not_found(RequestId::from(1), "bogus");
        let out = serde_json::to_value(&resp).unwrap();
        assert!(out.get("result").is_none());
        assert_eq!(out["error"]["code"], serde_json::json!(METHOD_NOT_FOUND));
        assert!(out["error"]["message"].as_str().unwrap().contains("bogus"));
    }

    #[test]
    fn test_recover_id_from_malformed_payload() {
        assert_eq!(
            RequestId::recover(r#"{"id": 7, "method": 12}"#),
            RequestId::Value(serde_json::json!(7))
        );
        assert_eq!(RequestId::recover(r#"{"id": null}"#), RequestId::Null);
        assert_eq!(RequestId::recover("not json at all"), RequestId::Absent);
        assert_eq!(RequestId::recover(r#"{"method":"x"}"#), RequestId::Absent);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Response::parse_error(RequestId::Absent, "x")
                .error
                .unwrap()
                .code,
            PARSE_ERROR
        );
        assert_eq!(
            Response::invalid_params(RequestId::Null, "x")
                .error
                .unwrap()
                .code,
            INVALID_PARAMS
        );
        assert_eq!(
            Response::tool_error(RequestId::from(1), "x")
                .error
                .unwrap()
                .code,
            TOOL_ERROR
        );
    }
}
