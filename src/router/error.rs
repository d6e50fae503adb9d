//! Router-specific error types.
//!
//! The taxonomy keeps local faults (a name that is not in the registry -
//! no bytes ever leave the process) distinct from transport faults (the
//! backend is unreachable or talks garbage) and from remote tool errors (the
//! backend answered with a well-formed error envelope).

use thiserror::Error;

use crate::core::rpc;

/// Errors that can occur while routing tool calls.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The server name is not in the registry. Resolved locally; no network
    /// call is attempted.
    #[error("Unknown server: {name}")]
    UnknownServer { name: String },

    /// The backend could not be reached, returned a non-success status, or
    /// returned a body that is not a JSON envelope.
    #[error("Transport fault talking to '{server}': {reason}")]
    Transport { server: String, reason: String },

    /// The backend answered with an error envelope. The remote message is
    /// carried verbatim.
    #[error("Remote tool error from '{server}' ({tool}): {message}")]
    Remote {
        server: String,
        tool: String,
        code: i64,
        message: String,
    },

    /// The backend answered 2xx JSON but the envelope made no sense.
    #[error("Invalid response from '{server}': {reason}")]
    InvalidResponse { server: String, reason: String },
}

impl RouterError {
    /// Create an unknown-server error.
    pub fn unknown_server(name: impl Into<String>) -> Self {
        Self::UnknownServer { name: name.into() }
    }

    /// Create a transport fault.
    pub fn transport(server: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            server: server.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid-response fault.
    pub fn invalid_response(server: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            server: server.into(),
            reason: reason.into(),
        }
    }

    /// The JSON-RPC error code this fault maps to on the router's own
    /// RPC surface.
    pub fn rpc_code(&self) -> i64 {
        match self {
            Self::UnknownServer { .. } | Self::Remote { .. } => rpc::TOOL_ERROR,
            Self::Transport { .. } | Self::InvalidResponse { .. } => rpc::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_carries_message_verbatim() {
        let err = RouterError::Remote {
            server: "formatter".to_string(),
            tool: "format_sql".to_string(),
            code: -32000,
            message: "syntax error near 'FROM'".to_string(),
        };
        assert!(err.to_string().contains("syntax error near 'FROM'"));
        assert!(err.to_string().contains("formatter"));
    }

    #[test]
    fn test_rpc_code_mapping() {
        assert_eq!(
            RouterError::unknown_server("x").rpc_code(),
            rpc::TOOL_ERROR
        );
        assert_eq!(
            RouterError::transport("x", "down").rpc_code(),
            rpc::INTERNAL_ERROR
        );
    }
}
