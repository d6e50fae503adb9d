//! Tool-specific error types.

use thiserror::Error;

use crate::core::rpc;

/// Errors that can occur during tool operations.
///
/// Expected failures (unknown tool, bad arguments, a handler that gives up)
/// are values carried back to the dispatch boundary, where they become error
/// envelopes; nothing in this module panics.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran but could not produce a result.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The JSON-RPC error code this fault maps to at the dispatch boundary.
    pub fn rpc_code(&self) -> i64 {
        match self {
            Self::NotFound(_) | Self::ExecutionFailed(_) => rpc::TOOL_ERROR,
            Self::InvalidArguments(_) => rpc::INVALID_PARAMS,
            Self::Internal(_) => rpc::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_code_mapping() {
        assert_eq!(ToolError::not_found("x").rpc_code(), rpc::TOOL_ERROR);
        assert_eq!(
            ToolError::invalid_arguments("x").rpc_code(),
            rpc::INVALID_PARAMS
        );
        assert_eq!(ToolError::execution_failed("x").rpc_code(), rpc::TOOL_ERROR);
        assert_eq!(ToolError::internal("x").rpc_code(), rpc::INTERNAL_ERROR);
    }

    #[test]
    fn test_message_carries_tool_name() {
        let err = ToolError::not_found("compare_schemas");
        assert!(err.to_string().contains("compare_schemas"));
    }
}
