//! File reading tool definition.

use std::fs;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::config::Config;
use crate::core::security::resolve_path;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::{ToolDescriptor, schema_for};

/// Default cap on file size, in bytes.
const DEFAULT_MAX_BYTES: u64 = 65_536;

/// Parameters for the file reading tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FsReadFileParams {
    /// Path to the file to read.
    pub path: String,

    /// Maximum file size to read, in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

/// File reading tool. UTF-8 text only.
pub struct FsReadFileTool;

impl FsReadFileTool {
    /// Tool name as advertised to clients.
    pub const NAME: &'static str = "fs_read_file";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Read a UTF-8 text file, refusing files larger than max_bytes (default 64 KiB).";

    /// Create the descriptor for this tool.
    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: Self::NAME.to_string(),
            description: Self::DESCRIPTION.to_string(),
            input_schema: schema_for::<FsReadFileParams>(),
        }
    }

    /// Registry entry point.
    pub fn handler(
        arguments: &serde_json::Value,
        config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let params: FsReadFileParams = serde_json::from_value(arguments.clone())
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
        Self::execute(&params, config)
    }

    /// Execute the tool logic.
    pub fn execute(
        params: &FsReadFileParams,
        config: &Config,
    ) -> Result<serde_json::Value, ToolError> {
        let path = resolve_path(&params.path, &config.security)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;

        if !path.is_file() {
            return Err(ToolError::execution_failed(format!(
                "not a regular file: {}",
                params.path
            )));
        }

        let len = fs::metadata(&path)
            .map_err(|e| ToolError::execution_failed(format!("cannot stat file: {e}")))?
            .len();
        if len > params.max_bytes {
            return Err(ToolError::execution_failed(format!(
                "file is {len} bytes, larger than the {} byte limit",
                params.max_bytes
            )));
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ToolError::execution_failed(format!("cannot read file: {e}")))?;

        Ok(serde_json::json!({
            "path": params.path,
            "bytes": len,
            "content": content,
        }))
    }
}
